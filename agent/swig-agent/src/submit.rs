use crate::error::{AgentError, Result};
use crate::pipeline::Stage;
use solana_sdk::instruction::Instruction;
use solana_sdk::message::Message;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::Transaction;
use swig_sdk::{SolConnection, SwigSigner};
use tracing::{debug, info};

/// Signs with the caller's key, submits, and waits for confirmation.
///
/// The caller pays fees and is the only signer. A fresh blockhash is
/// fetched for every submission; nothing is retried.
pub struct Submitter<'a> {
    connection: &'a dyn SolConnection,
    signer: &'a dyn SwigSigner,
}

impl<'a> Submitter<'a> {
    pub fn new(connection: &'a dyn SolConnection, signer: &'a dyn SwigSigner) -> Self {
        Self { connection, signer }
    }

    pub async fn submit(&self, instructions: &[Instruction]) -> Result<Signature> {
        let payer = self.signer.pubkey();

        debug!(stage = %Stage::Signing, instructions = instructions.len(), "signing transaction");
        let blockhash = self
            .connection
            .get_latest_blockhash()
            .await
            .map_err(|e| AgentError::Chain(format!("Failed to fetch blockhash: {}", e)))?;
        let message = Message::new_with_blockhash(instructions, Some(&payer), &blockhash);

        let required = usize::from(message.header.num_required_signatures);
        if required != 1 {
            return Err(AgentError::Chain(format!(
                "Transaction requires {} signatures but only the caller can sign",
                required
            )));
        }

        let signature = self
            .signer
            .sign_message(&message.serialize())
            .await
            .map_err(|e| AgentError::Chain(format!("Signing failed: {}", e)))?;
        let transaction = Transaction {
            signatures: vec![signature],
            message,
        };

        debug!(stage = %Stage::Submitting, %signature, "submitting transaction");
        let signature = self
            .connection
            .send_transaction(&transaction)
            .await
            .map_err(|e| AgentError::Chain(format!("Transaction submission failed: {}", e)))?;

        debug!(stage = %Stage::Confirming, %signature, "awaiting confirmation");
        self.connection
            .confirm_transaction(&signature)
            .await
            .map_err(|e| AgentError::Chain(format!("Transaction confirmation failed: {}", e)))?;

        info!(%signature, "transaction confirmed");
        Ok(signature)
    }
}
