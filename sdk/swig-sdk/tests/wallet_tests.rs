use assert_matches::assert_matches;
use pretty_assertions::assert_eq;
use solana_sdk::signature::{Keypair, Signer};
use solana_sdk::system_instruction;
use swig_sdk::advanced::builders::ActionsBuilder;
use swig_sdk::token::{
    create_associated_token_account, fetch_mint_decimals, fetch_token_balance,
    get_associated_token_address, token_account_exists, transfer_checked,
};
use swig_sdk::{Action, SwigSdkError, SwigWallet};

mod common;
use common::TestContext;

async fn create_wallet(context: &TestContext, owner: &Keypair) -> SwigWallet {
    let ix = SwigWallet::create()
        .with_program_id(context.program_id)
        .with_payer(context.payer.pubkey())
        .with_owner(owner.pubkey())
        .build_instruction()
        .unwrap();
    context.process(&[ix], &[]).await.unwrap();
    SwigWallet::fetch(context, &owner.pubkey(), Some(context.program_id))
        .await
        .unwrap()
}

#[tokio::test]
async fn test_create_wallet_has_single_root_role() {
    let context = TestContext::new();
    let owner = Keypair::new();

    let builder = SwigWallet::create()
        .with_payer(context.payer.pubkey())
        .with_owner(owner.pubkey());
    let expected = builder.get_address().unwrap();

    let wallet = create_wallet(&context, &owner).await;
    assert_eq!(wallet.address, expected);

    let info = wallet.fetch_info(&context).await.unwrap();
    assert_eq!(info.role_count, 1);
    assert_eq!(info.role_counter, 1);
    assert_eq!(info.roles[0].id, 0);
    assert_eq!(info.roles[0].ed25519_pubkey, Some(owner.pubkey()));
    assert_eq!(info.roles[0].actions, vec![Action::All]);
}

#[tokio::test]
async fn test_create_twice_is_rejected_by_program() {
    let context = TestContext::new();
    let owner = Keypair::new();
    create_wallet(&context, &owner).await;

    let ix = SwigWallet::create()
        .with_payer(context.payer.pubkey())
        .with_owner(owner.pubkey())
        .build_instruction()
        .unwrap();
    assert!(context.process(&[ix], &[]).await.is_err());
}

#[tokio::test]
async fn test_fetch_missing_wallet() {
    let context = TestContext::new();
    let owner = Keypair::new();
    let result = SwigWallet::fetch(&context, &owner.pubkey(), None).await;
    assert_matches!(result, Err(SwigSdkError::AccountNotFound(_)));

    let wallet = SwigWallet::for_owner(SwigWallet::DEFAULT_PROGRAM_ID, &owner.pubkey());
    assert!(!wallet.exists(&context).await.unwrap());
}

#[tokio::test]
async fn test_add_and_remove_authority() {
    let context = TestContext::new();
    let owner = Keypair::new();
    let wallet = create_wallet(&context, &owner).await;
    let spender = Keypair::new();

    let add = wallet
        .add_authority()
        .with_authority(spender.pubkey())
        .with_actions(ActionsBuilder::new().sol_limit(1_000).build())
        .with_acting_role(0)
        .with_authorizer(owner.pubkey())
        .build_instruction(context.payer.pubkey())
        .unwrap();
    context.process(&[add], &[&owner]).await.unwrap();

    let roles = wallet.fetch_info(&context).await.unwrap().roles;
    assert_eq!(roles.len(), 2);
    assert_eq!(roles[1].id, 1);
    assert!(roles[1].is_bound_to(&spender.pubkey()));
    assert_eq!(roles[1].actions, vec![Action::SolLimit { amount: 1_000 }]);

    let remove = wallet
        .remove_authority()
        .with_acting_role(0)
        .with_target_role(1)
        .with_authorizer(owner.pubkey())
        .build_instruction(context.payer.pubkey())
        .unwrap();
    context.process(&[remove], &[&owner]).await.unwrap();

    let info = wallet.fetch_info(&context).await.unwrap();
    assert_eq!(info.role_count, 1);
    // ids are never reused
    assert_eq!(info.role_counter, 2);
    assert!(swig_sdk::find_role(&info.roles, 1).is_none());
}

#[tokio::test]
async fn test_limited_role_cannot_manage_authorities() {
    let context = TestContext::new();
    let owner = Keypair::new();
    let wallet = create_wallet(&context, &owner).await;
    let spender = Keypair::new();

    let add = wallet
        .add_authority()
        .with_authority(spender.pubkey())
        .with_actions(vec![Action::SolLimit { amount: 10 }])
        .with_authorizer(owner.pubkey())
        .build_instruction(context.payer.pubkey())
        .unwrap();
    context.process(&[add], &[&owner]).await.unwrap();

    let remove = wallet
        .remove_authority()
        .with_acting_role(1)
        .with_target_role(0)
        .with_authorizer(spender.pubkey())
        .build_instruction(context.payer.pubkey())
        .unwrap();
    assert!(context.process(&[remove], &[&spender]).await.is_err());
}

#[tokio::test]
async fn test_sign_moves_sol_out_of_wallet() {
    let context = TestContext::new();
    let owner = Keypair::new();
    let wallet = create_wallet(&context, &owner).await;
    context.airdrop(&wallet.address, 2_000_000_000);
    let recipient = Keypair::new().pubkey();

    let ix = wallet
        .sign()
        .add_instruction(system_instruction::transfer(&wallet.address, &recipient, 1_500_000_000))
        .with_role_id(0)
        .with_authorizer(owner.pubkey())
        .build_instruction(context.payer.pubkey())
        .unwrap();
    context.process(&[ix], &[&owner]).await.unwrap();

    assert_eq!(context.lamports(&recipient), 1_500_000_000);
}

#[tokio::test]
async fn test_sign_rejects_wrong_authority() {
    let context = TestContext::new();
    let owner = Keypair::new();
    let wallet = create_wallet(&context, &owner).await;
    context.airdrop(&wallet.address, 1_000_000);
    let intruder = Keypair::new();

    let ix = wallet
        .sign()
        .add_instruction(system_instruction::transfer(
            &wallet.address,
            &intruder.pubkey(),
            1_000,
        ))
        .with_authorizer(intruder.pubkey())
        .build_instruction(context.payer.pubkey())
        .unwrap();
    assert!(context.process(&[ix], &[&intruder]).await.is_err());
    assert_eq!(context.lamports(&intruder.pubkey()), 0);
}

#[tokio::test]
async fn test_token_transfer_out_of_wallet_creates_destination() {
    let context = TestContext::new();
    let owner = Keypair::new();
    let wallet = create_wallet(&context, &owner).await;
    let mint = context.create_mint(6);
    context.mint_to(&mint, &wallet.address, 5_000_000);
    let recipient = Keypair::new().pubkey();

    assert_eq!(fetch_mint_decimals(&context, &mint).await.unwrap(), 6);
    assert!(!token_account_exists(&context, &recipient, &mint).await.unwrap());

    let create_ata = create_associated_token_account(&context.payer.pubkey(), &recipient, &mint);
    let transfer = transfer_checked(
        &get_associated_token_address(&wallet.address, &mint),
        &mint,
        &get_associated_token_address(&recipient, &mint),
        &wallet.address,
        1_250_000,
        6,
    );
    let sign = wallet
        .sign()
        .add_instruction(transfer)
        .with_authorizer(owner.pubkey())
        .build_instruction(context.payer.pubkey())
        .unwrap();
    context.process(&[create_ata, sign], &[&owner]).await.unwrap();

    assert_eq!(
        fetch_token_balance(&context, &recipient, &mint).await.unwrap(),
        Some(1_250_000)
    );
    assert_eq!(
        fetch_token_balance(&context, &wallet.address, &mint).await.unwrap(),
        Some(3_750_000)
    );
    assert_eq!(
        fetch_token_balance(&context, &Keypair::new().pubkey(), &mint)
            .await
            .unwrap(),
        None
    );
}
