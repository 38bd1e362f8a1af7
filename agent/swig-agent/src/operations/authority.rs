use super::{authority_target, unexpected, OperationKind, Request};
use crate::composer::lamports;
use crate::error::{AgentError, Result};
use crate::extract::Entities;
use crate::pipeline::{Context, Operation, Plan};
use crate::resolver::{AuthorityContext, Permission};
use async_trait::async_trait;
use serde_json::{Map, Value};
use swig_sdk::Action;

/// Add an Ed25519 authority. A number tied to `limit` or `SOL` becomes a SOL
/// spend limit; otherwise the new role gets full permissions.
pub struct AddSwigAuthority;

#[async_trait]
impl Operation for AddSwigAuthority {
    fn kind(&self) -> OperationKind {
        OperationKind::AddSwigAuthority
    }

    fn parse(&self, entities: &Entities) -> Result<Request> {
        let authority = entities.recipient_or_first().ok_or_else(|| {
            AgentError::parse(
                "No authority address found in the message",
                "Try \"add authority <address>\" or \"add authority <address> with a 2 SOL limit\"",
            )
        })?;
        let actions = match entities.sol_limit {
            Some(amount) => vec![Action::SolLimit {
                amount: lamports(amount)?,
            }],
            None => vec![Action::All],
        };
        Ok(Request::AddAuthority { authority, actions })
    }

    async fn plan(&self, ctx: &Context<'_>, request: Request) -> Result<Plan> {
        let Request::AddAuthority { authority, actions } = request else {
            return Err(unexpected(self.kind()));
        };
        let authorities =
            AuthorityContext::load_for_caller(ctx.connection, &ctx.wallet, &ctx.caller).await?;
        authorities.ensure_not_authority(&authority)?;
        let acting = authorities.acting_role(Permission::ManageAuthorities)?;

        let labels: Vec<String> = actions.iter().map(Action::label).collect();
        let instructions =
            ctx.composer()
                .add_authority(&ctx.wallet, acting, authority, actions)?;

        let mut data = Map::new();
        data.insert("address".into(), Value::String(ctx.wallet.address.to_string()));
        data.insert("authority".into(), Value::String(authority.to_string()));
        data.insert("role_id".into(), Value::from(authorities.role_counter));
        data.insert("acting_role".into(), Value::from(acting.id));
        data.insert(
            "actions".into(),
            Value::Array(labels.iter().cloned().map(Value::String).collect()),
        );
        Ok(Plan::Submit {
            instructions,
            text: format!(
                "Added {} as role {} on Swig wallet {} with permissions [{}].",
                authority,
                authorities.role_counter,
                ctx.wallet.address,
                labels.join(", ")
            ),
            data,
        })
    }
}

/// Remove an authority by role id or key.
pub struct RemoveSwigAuthority;

#[async_trait]
impl Operation for RemoveSwigAuthority {
    fn kind(&self) -> OperationKind {
        OperationKind::RemoveSwigAuthority
    }

    fn parse(&self, entities: &Entities) -> Result<Request> {
        authority_target(entities, "remove authority role 1").map(Request::RemoveAuthority)
    }

    async fn plan(&self, ctx: &Context<'_>, request: Request) -> Result<Plan> {
        let Request::RemoveAuthority(target) = request else {
            return Err(unexpected(self.kind()));
        };
        let authorities =
            AuthorityContext::load_for_caller(ctx.connection, &ctx.wallet, &ctx.caller).await?;
        let removed = authorities.resolve_removal(target)?;
        let acting = authorities.acting_role(Permission::ManageAuthorities)?;

        let instructions = ctx
            .composer()
            .remove_authority(&ctx.wallet, acting, removed)?;

        let authority = removed
            .ed25519_pubkey
            .map(|key| key.to_string())
            .unwrap_or_default();
        let mut data = Map::new();
        data.insert("address".into(), Value::String(ctx.wallet.address.to_string()));
        data.insert("role_id".into(), Value::from(removed.id));
        data.insert("authority".into(), Value::String(authority.clone()));
        data.insert("acting_role".into(), Value::from(acting.id));
        Ok(Plan::Submit {
            instructions,
            text: format!(
                "Removed role {} ({}) from Swig wallet {}.",
                removed.id, authority, ctx.wallet.address
            ),
            data,
        })
    }
}
