use super::{require_wallet, unexpected, OperationKind, Request};
use crate::composer::format_amount;
use crate::error::{AgentError, Result};
use crate::extract::Entities;
use crate::pipeline::{Context, Operation, Plan};
use crate::resolver::AuthorityContext;
use crate::respond::Outcome;
use async_trait::async_trait;
use serde_json::json;
use swig_sdk::core::constants::SOL_DECIMALS;
use swig_sdk::token::{fetch_mint_decimals, fetch_token_balance, get_associated_token_address};
use swig_sdk::RoleInfo;
use tracing::debug;

pub struct GetSwigBalance;

#[async_trait]
impl Operation for GetSwigBalance {
    fn kind(&self) -> OperationKind {
        OperationKind::GetSwigBalance
    }

    fn parse(&self, _entities: &Entities) -> Result<Request> {
        Ok(Request::None)
    }

    async fn plan(&self, ctx: &Context<'_>, _request: Request) -> Result<Plan> {
        require_wallet(ctx).await?;
        let lamports = ctx.wallet.balance(ctx.connection).await?;
        let sol = format_amount(lamports, SOL_DECIMALS);
        Ok(Plan::Report(
            Outcome::new(format!("Swig wallet {} holds {} SOL.", ctx.wallet.address, sol))
                .with_data(json!({
                    "address": ctx.wallet.address.to_string(),
                    "lamports": lamports,
                    "sol": sol,
                })),
        ))
    }
}

/// Token balance of the wallet's associated account. An absent account
/// reads as zero.
pub struct GetSwigTokenBalance;

#[async_trait]
impl Operation for GetSwigTokenBalance {
    fn kind(&self) -> OperationKind {
        OperationKind::GetSwigTokenBalance
    }

    fn parse(&self, entities: &Entities) -> Result<Request> {
        let mint = entities.mint_or_first().ok_or_else(|| {
            AgentError::parse(
                "No token mint address found in the message",
                "Try \"get swig token balance for <mint address>\"",
            )
        })?;
        Ok(Request::TokenBalance { mint })
    }

    async fn plan(&self, ctx: &Context<'_>, request: Request) -> Result<Plan> {
        let Request::TokenBalance { mint } = request else {
            return Err(unexpected(self.kind()));
        };
        require_wallet(ctx).await?;

        let token_account = get_associated_token_address(&ctx.wallet.address, &mint);
        let (units, amount) = match fetch_token_balance(ctx.connection, &ctx.wallet.address, &mint).await? {
            Some(units) => {
                let decimals = fetch_mint_decimals(ctx.connection, &mint).await?;
                (units, format_amount(units, decimals))
            },
            None => {
                debug!(%mint, %token_account, "no token account, balance is zero");
                (0, "0".to_string())
            },
        };

        Ok(Plan::Report(
            Outcome::new(format!(
                "Swig wallet {} holds {} tokens of mint {}.",
                ctx.wallet.address, amount, mint
            ))
            .with_data(json!({
                "address": ctx.wallet.address.to_string(),
                "mint": mint.to_string(),
                "token_account": token_account.to_string(),
                "units": units,
                "amount": amount,
            })),
        ))
    }
}

/// List every role on the wallet. Any caller may list.
pub struct GetSwigAuthorities;

#[async_trait]
impl Operation for GetSwigAuthorities {
    fn kind(&self) -> OperationKind {
        OperationKind::GetSwigAuthorities
    }

    fn parse(&self, _entities: &Entities) -> Result<Request> {
        Ok(Request::None)
    }

    async fn plan(&self, ctx: &Context<'_>, _request: Request) -> Result<Plan> {
        let authorities = AuthorityContext::load(ctx.connection, &ctx.wallet, &ctx.caller).await?;

        let mut text = format!(
            "Swig wallet {} has {} authorit{}:",
            ctx.wallet.address,
            authorities.roles.len(),
            if authorities.roles.len() == 1 { "y" } else { "ies" }
        );
        for role in &authorities.roles {
            text.push_str("\n- ");
            text.push_str(&describe_role(role, &ctx.caller));
        }

        Ok(Plan::Report(Outcome::new(text).with_data(json!({
            "address": ctx.wallet.address.to_string(),
            "role_counter": authorities.role_counter,
            "roles": authorities.roles,
        }))))
    }
}

fn describe_role(role: &RoleInfo, caller: &solana_sdk::pubkey::Pubkey) -> String {
    let authority = role
        .ed25519_pubkey
        .map(|key| key.to_string())
        .unwrap_or_else(|| format!("{:?} authority", role.authority_type));
    let actions: Vec<String> = role.actions.iter().map(|a| a.label()).collect();
    let you = if role.is_bound_to(caller) { " (you)" } else { "" };
    format!("Role {}: {}{} [{}]", role.id, authority, you, actions.join(", "))
}
