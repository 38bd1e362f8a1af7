use super::{unexpected, OperationKind, Request};
use crate::error::Result;
use crate::extract::Entities;
use crate::pipeline::{Context, Operation, Plan};
use crate::respond::Outcome;
use async_trait::async_trait;
use serde_json::{json, Map, Value};
use tracing::info;

/// Create the caller's wallet. Reports the existing wallet instead of
/// failing when it was already created.
pub struct CreateSwig;

#[async_trait]
impl Operation for CreateSwig {
    fn kind(&self) -> OperationKind {
        OperationKind::CreateSwig
    }

    fn parse(&self, _entities: &Entities) -> Result<Request> {
        Ok(Request::None)
    }

    async fn plan(&self, ctx: &Context<'_>, request: Request) -> Result<Plan> {
        if request != Request::None {
            return Err(unexpected(self.kind()));
        }
        let address = ctx.wallet.address;

        if ctx.wallet.exists(ctx.connection).await? {
            info!(wallet = %address, "wallet already exists");
            return Ok(Plan::Report(
                Outcome::new(format!("Swig wallet already exists at {}.", address))
                    .with_data(json!({ "address": address.to_string(), "created": false })),
            ));
        }

        let instructions = ctx.composer().create_wallet(ctx.config.program_id)?;
        let mut data = Map::new();
        data.insert("address".into(), Value::String(address.to_string()));
        data.insert("created".into(), Value::Bool(true));
        data.insert("authority".into(), Value::String(ctx.caller.to_string()));
        Ok(Plan::Submit {
            instructions,
            text: format!(
                "Created Swig wallet at {} with {} as its root authority.",
                address, ctx.caller
            ),
            data,
        })
    }
}

/// Report the caller's derived wallet address and whether it exists.
pub struct GetSwigAddress;

#[async_trait]
impl Operation for GetSwigAddress {
    fn kind(&self) -> OperationKind {
        OperationKind::GetSwigAddress
    }

    fn parse(&self, _entities: &Entities) -> Result<Request> {
        Ok(Request::None)
    }

    async fn plan(&self, ctx: &Context<'_>, _request: Request) -> Result<Plan> {
        let address = ctx.wallet.address;
        let exists = ctx.wallet.exists(ctx.connection).await?;
        let text = if exists {
            format!("Your Swig wallet address is {}.", address)
        } else {
            format!(
                "Your Swig wallet address will be {}. It has not been created yet; say \"create swig\" to create it.",
                address
            )
        };
        Ok(Plan::Report(Outcome::new(text).with_data(json!({
            "address": address.to_string(),
            "exists": exists,
        }))))
    }
}
