//! Authority resolution against live wallet state.
//!
//! All checks run after the role list is fetched and before any
//! instruction is built.

use crate::error::{AgentError, Result};
use solana_sdk::pubkey::Pubkey;
use swig_sdk::{RoleInfo, SolConnection, SwigSdkError, SwigWallet};
use tracing::debug;

/// What the acting role must be allowed to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    ManageAuthorities,
    SpendSol,
    SpendToken(Pubkey),
}

impl Permission {
    fn granted_by(&self, role: &RoleInfo) -> bool {
        match self {
            Permission::ManageAuthorities => role.can_manage_authorities(),
            Permission::SpendSol => role.can_spend_sol(),
            Permission::SpendToken(mint) => role.can_spend_token(mint),
        }
    }
}

/// A textual reference to an authority on the wallet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Role(u32),
    Address(Pubkey),
}

/// Wallet roles as observed at resolution time, plus the caller's share.
#[derive(Debug, Clone)]
pub struct AuthorityContext {
    pub wallet: SwigWallet,
    pub caller: Pubkey,
    pub roles: Vec<RoleInfo>,
    pub role_counter: u32,
}

impl AuthorityContext {
    /// Fetch the wallet's roles.
    ///
    /// Fails with `WalletNotFound` when the wallet account does not exist.
    pub async fn load(
        connection: &dyn SolConnection,
        wallet: &SwigWallet,
        caller: &Pubkey,
    ) -> Result<Self> {
        let info = wallet
            .fetch_info(connection)
            .await
            .map_err(|e| match e {
                SwigSdkError::AccountNotFound(_) => AgentError::WalletNotFound(*caller),
                other => other.into(),
            })?;
        debug!(wallet = %wallet.address, roles = info.roles.len(), "wallet roles loaded");

        Ok(Self {
            wallet: wallet.clone(),
            caller: *caller,
            roles: info.roles,
            role_counter: info.role_counter,
        })
    }

    /// Like [`load`](Self::load) but also requires the caller to hold a role.
    pub async fn load_for_caller(
        connection: &dyn SolConnection,
        wallet: &SwigWallet,
        caller: &Pubkey,
    ) -> Result<Self> {
        let context = Self::load(connection, wallet, caller).await?;
        if context.caller_roles().is_empty() {
            return Err(AgentError::authorization(
                "Caller is not an authority on this Swig wallet",
            ));
        }
        Ok(context)
    }

    pub fn caller_roles(&self) -> Vec<&RoleInfo> {
        swig_sdk::find_roles_by_authority(&self.roles, &self.caller)
    }

    /// Role the caller acts through for `permission`.
    pub fn acting_role(&self, permission: Permission) -> Result<&RoleInfo> {
        select_acting_role(&self.caller_roles(), permission).ok_or_else(|| {
            AgentError::authorization("Caller is not an authority on this Swig wallet")
        })
    }

    pub fn resolve_target(&self, target: Target) -> Result<&RoleInfo> {
        resolve_target(&self.roles, target)
    }

    /// Resolve the role to remove, refusing to empty the wallet or remove
    /// the caller's own authority.
    pub fn resolve_removal(&self, target: Target) -> Result<&RoleInfo> {
        let role = self.resolve_target(target)?;
        check_removal(&self.roles, &self.caller, role)?;
        Ok(role)
    }

    /// Refuse to bind `authority` to a second role.
    pub fn ensure_not_authority(&self, authority: &Pubkey) -> Result<()> {
        if self.roles.iter().any(|r| r.is_bound_to(authority)) {
            return Err(AgentError::authorization(format!(
                "{} is already an authority on this Swig wallet",
                authority
            )));
        }
        Ok(())
    }
}

/// First role permitting `permission`, else the first role.
///
/// When no role grants the permission the program is left to enforce it.
pub fn select_acting_role<'a>(
    caller_roles: &[&'a RoleInfo],
    permission: Permission,
) -> Option<&'a RoleInfo> {
    caller_roles
        .iter()
        .find(|role| permission.granted_by(role))
        .or_else(|| caller_roles.first())
        .copied()
}

pub fn resolve_target(roles: &[RoleInfo], target: Target) -> Result<&RoleInfo> {
    match target {
        Target::Role(id) => swig_sdk::find_role(roles, id)
            .ok_or_else(|| AgentError::authorization(format!("Role {} not found on this Swig wallet", id))),
        Target::Address(address) => roles
            .iter()
            .find(|r| r.is_bound_to(&address))
            .ok_or_else(|| {
                AgentError::authorization("Address is not an authority on this Swig wallet")
            }),
    }
}

pub fn check_removal(roles: &[RoleInfo], caller: &Pubkey, target: &RoleInfo) -> Result<()> {
    if roles.len() <= 1 {
        return Err(AgentError::authorization(
            "Cannot remove the last authority from a Swig wallet",
        ));
    }
    if target.is_bound_to(caller) {
        return Err(AgentError::authorization(
            "Cannot remove your own authority from a Swig wallet",
        ));
    }
    Ok(())
}
