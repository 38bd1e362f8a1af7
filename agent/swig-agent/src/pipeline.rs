//! Generic pipeline engine.
//!
//! ```text
//! Idle -> Validating -> Extracting -> Resolving -> Composing
//!      -> Signing -> Submitting -> Confirming -> Responded
//! ```
//!
//! Every operation runs through the same stages; an [`Operation`] strategy
//! supplies the intent rule, entity parsing and plan. Any error jumps
//! straight to `Responded` through the failure path.

use crate::composer::Composer;
use crate::config::AgentConfig;
use crate::error::{AgentError, Result};
use crate::extract::Entities;
use crate::intent;
use crate::operations::{self, Category, OperationKind, Request};
use crate::respond::{Outcome, Response};
use crate::submit::Submitter;
use async_trait::async_trait;
use serde_json::{Map, Value};
use solana_sdk::instruction::Instruction;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signer::Signer;
use std::fmt;
use std::sync::Arc;
use swig_sdk::{SolConnection, SwigWallet};
use tracing::{debug, info, warn};

/// Inbound message from the host runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub text: String,
    pub source: String,
}

impl Message {
    pub fn new(text: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source: source.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    Validating,
    Extracting,
    Resolving,
    Composing,
    Signing,
    Submitting,
    Confirming,
    Responded,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Idle => "idle",
            Stage::Validating => "validating",
            Stage::Extracting => "extracting",
            Stage::Resolving => "resolving",
            Stage::Composing => "composing",
            Stage::Signing => "signing",
            Stage::Submitting => "submitting",
            Stage::Confirming => "confirming",
            Stage::Responded => "responded",
        };
        f.write_str(name)
    }
}

/// Per-invocation state handed to a strategy.
pub struct Context<'a> {
    pub connection: &'a dyn SolConnection,
    pub config: &'a AgentConfig,
    pub caller: Pubkey,
    /// The caller's wallet, derived from their key
    pub wallet: SwigWallet,
}

impl<'a> Context<'a> {
    pub fn composer(&self) -> Composer<'a> {
        debug!(stage = %Stage::Composing, wallet = %self.wallet.address, "composing");
        Composer::new(self.connection, self.caller)
    }
}

/// What a strategy wants the engine to do.
#[derive(Debug)]
pub enum Plan {
    /// Read-only result, nothing to submit
    Report(Outcome),
    /// Submit `instructions`; on confirmation reply with `text` followed by
    /// the signature, and `data` extended with it
    Submit {
        instructions: Vec<Instruction>,
        text: String,
        data: Map<String, Value>,
    },
}

/// Operation-specific strategy plugged into the engine.
#[async_trait]
pub trait Operation: Send + Sync {
    fn kind(&self) -> OperationKind;

    fn matches(&self, text: &str) -> bool {
        intent::matches(self.kind(), text)
    }

    /// Turn extracted entities into a request. No chain I/O.
    fn parse(&self, entities: &Entities) -> Result<Request>;

    /// Resolve authorities against chain state and compose the plan.
    async fn plan(&self, ctx: &Context<'_>, request: Request) -> Result<Plan>;
}

/// Operations enabled for an agent. Fixed at start-up.
pub struct OperationSet {
    operations: Vec<Box<dyn Operation>>,
}

impl OperationSet {
    pub fn get(&self, kind: OperationKind) -> Option<&dyn Operation> {
        self.operations
            .iter()
            .find(|op| op.kind() == kind)
            .map(|op| op.as_ref())
    }

    pub fn kinds(&self) -> Vec<OperationKind> {
        self.operations.iter().map(|op| op.kind()).collect()
    }

    pub fn contains(&self, kind: OperationKind) -> bool {
        self.get(kind).is_some()
    }
}

/// Operations permitted by the feature flags in `config`.
pub fn select_operations(config: &AgentConfig) -> OperationSet {
    let operations = operations::catalog()
        .into_iter()
        .filter(|op| match op.kind().category() {
            Category::Transfer => config.transfers_enabled,
            Category::Authority => config.authority_management_enabled,
            Category::Wallet | Category::Query => true,
        })
        .collect();
    OperationSet { operations }
}

/// Text to transaction pipeline. Shareable across concurrent invocations.
pub struct Agent {
    config: AgentConfig,
    connection: Arc<dyn SolConnection>,
    operations: OperationSet,
}

impl Agent {
    pub fn new(config: AgentConfig, connection: Arc<dyn SolConnection>) -> Self {
        let operations = select_operations(&config);
        info!(enabled = operations.operations.len(), "swig agent ready");
        Self {
            config,
            connection,
            operations,
        }
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn operations(&self) -> &OperationSet {
        &self.operations
    }

    /// Every action whose intent `text` expresses, in catalog order,
    /// including disabled ones.
    pub fn matching_actions(&self, text: &str) -> Vec<OperationKind> {
        intent::matching_operations(text)
    }

    /// Run the first matching action, if any.
    pub async fn dispatch(&self, message: &Message) -> Option<Response> {
        let kind = *self.matching_actions(&message.text).first()?;
        Some(self.handle(kind, message).await)
    }

    /// Run `kind` against `message`. Never fails; errors become a failure
    /// response.
    pub async fn handle(&self, kind: OperationKind, message: &Message) -> Response {
        let response = match self.run(kind, message).await {
            Ok(outcome) => Response::success(kind, outcome, &message.source),
            Err(error) => {
                warn!(operation = %kind, error_kind = error.kind(), %error, "operation failed");
                Response::failure(kind, kind.describe(), &error, &message.source)
            },
        };
        debug!(operation = %kind, stage = %Stage::Responded, "responded");
        response
    }

    async fn run(&self, kind: OperationKind, message: &Message) -> Result<Outcome> {
        debug!(operation = %kind, stage = %Stage::Validating, "validating");
        let operation = self
            .operations
            .get(kind)
            .ok_or_else(|| AgentError::FeatureDisabled(kind.category().label()))?;
        let keypair = self.config.keypair()?;
        let caller = keypair.pubkey();

        debug!(operation = %kind, stage = %Stage::Extracting, "extracting entities");
        let entities = Entities::from_text(&message.text);
        let request = operation.parse(&entities)?;

        let ctx = Context {
            connection: self.connection.as_ref(),
            config: &self.config,
            caller,
            wallet: SwigWallet::for_owner(self.config.program_id, &caller),
        };
        debug!(operation = %kind, stage = %Stage::Resolving, wallet = %ctx.wallet.address, "resolving");
        let plan = operation.plan(&ctx, request).await?;

        match plan {
            Plan::Report(outcome) => Ok(outcome),
            Plan::Submit {
                instructions,
                text,
                mut data,
            } => {
                let signature = Submitter::new(ctx.connection, &keypair)
                    .submit(&instructions)
                    .await?;
                info!(operation = %kind, %signature, wallet = %ctx.wallet.address, "operation confirmed");
                data.insert("signature".to_string(), Value::String(signature.to_string()));
                Ok(Outcome::new(format!("{} Transaction: {}", text, signature))
                    .with_data(Value::Object(data)))
            },
        }
    }
}
