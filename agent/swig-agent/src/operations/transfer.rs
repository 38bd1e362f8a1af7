use super::{
    authority_target, destination_of, require_amount, require_wallet, target_of, unexpected,
    OperationKind, Request,
};
use crate::composer::{format_amount, lamports};
use crate::error::{AgentError, Result};
use crate::extract::{Destination, Entities, TransferRequest};
use crate::pipeline::{Context, Operation, Plan};
use crate::resolver::{AuthorityContext, Permission};
use async_trait::async_trait;
use serde_json::{Map, Value};
use solana_sdk::pubkey::Pubkey;
use swig_sdk::core::constants::SOL_DECIMALS;

/// Which way value moves relative to the caller's wallet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Caller to wallet
    IntoWallet,
    /// Wallet to any address
    ToAddress,
    /// Wallet to an authority of the wallet
    ToAuthority,
}

/// Native SOL transfers.
pub struct NativeTransfer {
    direction: Direction,
}

impl NativeTransfer {
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
}

#[async_trait]
impl Operation for NativeTransfer {
    fn kind(&self) -> OperationKind {
        match self.direction {
            Direction::IntoWallet => OperationKind::TransferToSwig,
            Direction::ToAddress => OperationKind::TransferFromSwig,
            Direction::ToAuthority => OperationKind::TransferToAuthority,
        }
    }

    fn parse(&self, entities: &Entities) -> Result<Request> {
        let (example, destination) = match self.direction {
            Direction::IntoWallet => ("transfer 1 SOL to swig", Destination::Wallet),
            Direction::ToAddress => {
                let example = "transfer 1 SOL from swig to <address>";
                let recipient = entities.recipient_or_first().ok_or_else(|| {
                    AgentError::parse(
                        "No recipient address found in the message",
                        format!("Try \"{}\"", example),
                    )
                })?;
                (example, Destination::Address(recipient))
            },
            Direction::ToAuthority => {
                let example = "transfer 1 SOL from swig to authority <address>";
                (example, destination_of(authority_target(entities, example)?))
            },
        };
        let amount = require_amount(entities, example)?;
        // reject unrepresentable amounts before any chain I/O
        lamports(amount)?;
        Ok(Request::Transfer(TransferRequest {
            amount,
            mint: None,
            from_wallet: self.direction != Direction::IntoWallet,
            destination,
        }))
    }

    async fn plan(&self, ctx: &Context<'_>, request: Request) -> Result<Plan> {
        let Request::Transfer(transfer) = request else {
            return Err(unexpected(self.kind()));
        };
        let lamports = lamports(transfer.amount)?;
        let sol = format_amount(lamports, SOL_DECIMALS);
        let wallet = ctx.wallet.address;

        let mut data = Map::new();
        data.insert("address".into(), Value::String(wallet.to_string()));
        data.insert("lamports".into(), Value::from(lamports));
        data.insert("amount".into(), Value::String(sol.clone()));

        if !transfer.from_wallet {
            require_wallet(ctx).await?;
            let instructions = ctx.composer().sol_into_wallet(&ctx.wallet, lamports);
            data.insert("from".into(), Value::String(ctx.caller.to_string()));
            data.insert("to".into(), Value::String(wallet.to_string()));
            return Ok(Plan::Submit {
                instructions,
                text: format!("Transferred {} SOL to Swig wallet {}.", sol, wallet),
                data,
            });
        }

        let authorities =
            AuthorityContext::load_for_caller(ctx.connection, &ctx.wallet, &ctx.caller).await?;
        let (recipient, role_id) = match target_of(transfer.destination) {
            Some(target) if self.direction == Direction::ToAuthority => {
                let role = authorities.resolve_target(target)?;
                (authority_key(role)?, Some(role.id))
            },
            _ => match transfer.destination {
                Destination::Address(address) => (address, None),
                _ => return Err(unexpected(self.kind())),
            },
        };
        let acting = authorities.acting_role(Permission::SpendSol)?;
        let instructions = ctx
            .composer()
            .sol_out_of_wallet(&ctx.wallet, acting, &recipient, lamports)?;

        data.insert("from".into(), Value::String(wallet.to_string()));
        data.insert("to".into(), Value::String(recipient.to_string()));
        data.insert("acting_role".into(), Value::from(acting.id));
        let text = match role_id {
            Some(id) => {
                data.insert("role_id".into(), Value::from(id));
                format!(
                    "Transferred {} SOL from Swig wallet {} to authority {} (role {}).",
                    sol, wallet, recipient, id
                )
            },
            None => format!(
                "Transferred {} SOL from Swig wallet {} to {}.",
                sol, wallet, recipient
            ),
        };
        Ok(Plan::Submit {
            instructions,
            text,
            data,
        })
    }
}

/// Key that receives funds sent to `role`.
pub(super) fn authority_key(role: &swig_sdk::RoleInfo) -> Result<Pubkey> {
    role.ed25519_pubkey.ok_or_else(|| {
        AgentError::authorization(format!(
            "Role {} is not bound to an Ed25519 key and cannot receive transfers",
            role.id
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::Target;
    use assert_matches::assert_matches;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    #[test]
    fn test_parse_into_wallet() {
        let request = NativeTransfer::to_swig()
            .parse(&Entities::from_text("transfer 1.5 SOL to swig"))
            .unwrap();
        assert_eq!(
            request,
            Request::Transfer(TransferRequest {
                amount: Decimal::from_str("1.5").unwrap(),
                mint: None,
                from_wallet: false,
                destination: Destination::Wallet,
            })
        );
    }

    #[test]
    fn test_parse_to_address_and_authority() {
        let key = Pubkey::new_unique();
        let text = format!("transfer 2 SOL from swig to {}", key);
        assert_matches!(
            NativeTransfer::from_swig().parse(&Entities::from_text(&text)),
            Ok(Request::Transfer(TransferRequest { destination: Destination::Address(a), from_wallet: true, .. })) if a == key
        );
        assert_matches!(
            NativeTransfer::to_authority().parse(&Entities::from_text("send 2 SOL from swig to role 1")),
            Ok(Request::Transfer(TransferRequest { destination: Destination::Role(1), .. }))
        );
        assert_eq!(target_of(Destination::Role(1)), Some(Target::Role(1)));
    }

    #[test]
    fn test_parse_rejects_missing_pieces() {
        assert_matches!(
            NativeTransfer::to_swig().parse(&Entities::from_text("transfer SOL to swig")),
            Err(AgentError::Parse { .. })
        );
        assert_matches!(
            NativeTransfer::from_swig().parse(&Entities::from_text("transfer 1 SOL from swig")),
            Err(AgentError::Parse { .. })
        );
        assert_matches!(
            NativeTransfer::to_swig().parse(&Entities::from_text("transfer 0.0000000001 SOL to swig")),
            Err(AgentError::Parse { message, .. }) if message.contains("decimal places")
        );
    }
}
