use super::transfer::{authority_key, Direction};
use super::{require_amount, require_wallet, target_of, unexpected, OperationKind, Request};
use crate::composer::{self, format_amount};
use crate::error::{AgentError, Result};
use crate::extract::{Destination, Entities, TransferRequest};
use crate::pipeline::{Context, Operation, Plan};
use crate::resolver::{AuthorityContext, Permission, Target};
use async_trait::async_trait;
use serde_json::{Map, Value};
use solana_sdk::pubkey::Pubkey;

/// SPL token transfers. Amounts are scaled by the mint's decimals.
pub struct TokenTransfer {
    direction: Direction,
}

impl TokenTransfer {
    pub fn to_swig() -> Self {
        Self {
            direction: Direction::IntoWallet,
        }
    }

    pub fn from_swig() -> Self {
        Self {
            direction: Direction::ToAddress,
        }
    }

    pub fn to_authority() -> Self {
        Self {
            direction: Direction::ToAuthority,
        }
    }

    fn example(&self) -> &'static str {
        match self.direction {
            Direction::IntoWallet => "transfer 10 tokens of mint <mint> to swig",
            Direction::ToAddress => "transfer 10 tokens of mint <mint> from swig to <address>",
            Direction::ToAuthority => {
                "transfer 10 tokens of mint <mint> from swig to authority <address>"
            },
        }
    }
}

fn missing_mint(example: &str) -> AgentError {
    AgentError::parse(
        "No token mint address found in the message",
        format!("Try \"{}\"", example),
    )
}

#[async_trait]
impl Operation for TokenTransfer {
    fn kind(&self) -> OperationKind {
        match self.direction {
            Direction::IntoWallet => OperationKind::TransferTokenToSwig,
            Direction::ToAddress => OperationKind::TransferTokenFromSwig,
            Direction::ToAuthority => OperationKind::TransferTokenToAuthority,
        }
    }

    fn parse(&self, entities: &Entities) -> Result<Request> {
        let example = self.example();
        let amount = require_amount(entities, example)?;

        let (mint, destination) = match (self.direction, entities.role_id) {
            (Direction::IntoWallet, _) => {
                let mint = entities.mint_or_first().ok_or_else(|| missing_mint(example))?;
                (mint, Destination::Wallet)
            },
            (Direction::ToAuthority, Some(id)) => {
                let mint = entities.mint_or_first().ok_or_else(|| missing_mint(example))?;
                (mint, Destination::Role(id))
            },
            _ => {
                let (mint, recipient) = entities.mint_and_recipient();
                let mint = mint.ok_or_else(|| missing_mint(example))?;
                let recipient = recipient.ok_or_else(|| {
                    AgentError::parse(
                        "No recipient address found in the message",
                        format!("Try \"{}\"", example),
                    )
                })?;
                (mint, Destination::Address(recipient))
            },
        };

        if amount <= rust_decimal::Decimal::ZERO {
            return Err(AgentError::parse(
                format!("Amount {} must be greater than zero", amount),
                "Specify a positive amount such as 10",
            ));
        }
        Ok(Request::Transfer(TransferRequest {
            amount,
            mint: Some(mint),
            from_wallet: self.direction != Direction::IntoWallet,
            destination,
        }))
    }

    async fn plan(&self, ctx: &Context<'_>, request: Request) -> Result<Plan> {
        let Request::Transfer(TransferRequest {
            amount,
            mint: Some(mint),
            from_wallet,
            destination,
        }) = request
        else {
            return Err(unexpected(self.kind()));
        };
        let wallet = ctx.wallet.address;

        if !from_wallet {
            require_wallet(ctx).await?;
            let transfer = ctx.composer().token_into_wallet(&ctx.wallet, &mint, amount).await?;
            let shown = format_amount(transfer.units, transfer.decimals);
            let mut data = token_data(&wallet, &mint, &transfer);
            data.insert("from".into(), Value::String(ctx.caller.to_string()));
            data.insert("to".into(), Value::String(wallet.to_string()));
            return Ok(Plan::Submit {
                instructions: transfer.instructions,
                text: format!(
                    "Transferred {} tokens of mint {} to Swig wallet {}.",
                    shown, mint, wallet
                ),
                data,
            });
        }

        let authorities =
            AuthorityContext::load_for_caller(ctx.connection, &ctx.wallet, &ctx.caller).await?;
        let (recipient, role_id) = match (self.direction, target_of(destination)) {
            (Direction::ToAuthority, Some(target)) => {
                let role = authorities.resolve_target(target)?;
                (authority_key(role)?, Some(role.id))
            },
            (_, Some(Target::Address(address))) => (address, None),
            _ => return Err(unexpected(self.kind())),
        };
        let acting = authorities.acting_role(Permission::SpendToken(mint))?;
        let transfer = ctx
            .composer()
            .token_out_of_wallet(&ctx.wallet, acting, &recipient, &mint, amount)
            .await?;
        let shown = format_amount(transfer.units, transfer.decimals);

        let mut data = token_data(&wallet, &mint, &transfer);
        data.insert("from".into(), Value::String(wallet.to_string()));
        data.insert("to".into(), Value::String(recipient.to_string()));
        data.insert("acting_role".into(), Value::from(acting.id));
        let text = match role_id {
            Some(id) => {
                data.insert("role_id".into(), Value::from(id));
                format!(
                    "Transferred {} tokens of mint {} from Swig wallet {} to authority {} (role {}).",
                    shown, mint, wallet, recipient, id
                )
            },
            None => format!(
                "Transferred {} tokens of mint {} from Swig wallet {} to {}.",
                shown, mint, wallet, recipient
            ),
        };
        Ok(Plan::Submit {
            instructions: transfer.instructions,
            text,
            data,
        })
    }
}

fn token_data(wallet: &Pubkey, mint: &Pubkey, transfer: &composer::TokenTransfer) -> Map<String, Value> {
    let mut data = Map::new();
    data.insert("address".into(), Value::String(wallet.to_string()));
    data.insert("mint".into(), Value::String(mint.to_string()));
    data.insert("units".into(), Value::from(transfer.units));
    data.insert("decimals".into(), Value::from(transfer.decimals));
    data.insert(
        "amount".into(),
        Value::String(format_amount(transfer.units, transfer.decimals)),
    );
    data.insert(
        "created_token_account".into(),
        Value::Bool(transfer.creates_account),
    );
    data
}
