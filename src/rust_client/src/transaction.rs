use solana_client::nonblocking::rpc_client::RpcClient;
use solana_program::instruction::Instruction;
use solana_sdk::{signature::Signature, signer::Signer, transaction::Transaction};

use crate::error::Result;

/// Signs `instructions` as one transaction paid by `payer`, submits it and
/// waits for confirmation at the client's commitment
pub async fn send_instructions<S: Signer>(
    rpc_client: &RpcClient,
    instructions: &[Instruction],
    payer: &S,
) -> Result<Signature> {
    let transaction = signed_transaction(rpc_client, instructions, payer).await?;

    log::debug!(
        "Submitting transaction with {} instruction(s) from {}",
        instructions.len(),
        payer.pubkey()
    );
    let signature = rpc_client
        .send_and_confirm_transaction(&transaction)
        .await?;
    log::info!("Transaction {} confirmed", signature);

    Ok(signature)
}

pub async fn signed_transaction<S: Signer>(
    rpc_client: &RpcClient,
    instructions: &[Instruction],
    payer: &S,
) -> Result<Transaction> {
    let payer_key = payer.pubkey();
    let mut transaction = Transaction::new_with_payer(instructions, Some(&payer_key));

    let blockhash = rpc_client.get_latest_blockhash().await?;
    transaction.sign(&[payer], blockhash);

    Ok(transaction)
}
