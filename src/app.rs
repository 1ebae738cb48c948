//! High-level workflows: account queries, account creation and FLOW
//! transfers, each driving the full lifecycle.
//!
//! # Data Flow
//! ```text
//! execute(script, arguments, signer):
//!     validate arguments (no I/O)
//!     → ScriptBundle::load
//!     → KeyResolver::resolve (fresh sequence number)
//!     → latest sealed block (reference block)
//!     → TransactionBuilder::build
//!     → sign_with_resolved_key (proposer = payer = authorizer)
//!     → Submitter::submit
//!     → ConfirmationPoller::await_seal
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use crate::access::{AccessApi, Account, Address, TransactionResult};
use crate::cadence::{CadenceValue, UFix64};
use crate::config::schema::ClientConfig;
use crate::crypto::{HashAlgorithm, PrivateKey, PublicKey, SignatureAlgorithm};
use crate::error::{LifecycleError, LifecycleResult};
use crate::lifecycle::{
    extract_created_address, CancellationToken, ConfirmationPoller, KeyResolver, PollPolicy,
    Submitter,
};
use crate::scripts::{self, ScriptBundle};
use crate::transaction::encoding::{rlp_bytes, rlp_list, rlp_uint};
use crate::transaction::{sign_with_resolved_key, TransactionBuilder};

/// Weight that alone meets the signing threshold of an account.
pub const FULL_KEY_WEIGHT: u32 = 1000;

/// Public key to register on a new account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccountKey {
    pub public_key: PublicKey,
    pub hash_algo: HashAlgorithm,
    pub weight: u32,
}

impl NewAccountKey {
    /// Full-weight key.
    pub fn new(public_key: PublicKey, hash_algo: HashAlgorithm) -> Self {
        Self {
            public_key,
            hash_algo,
            weight: FULL_KEY_WEIGHT,
        }
    }

    /// `RLP([public_key, sign_algo, hash_algo, weight])`, the form account
    /// creation scripts decode.
    pub fn encode(&self) -> Vec<u8> {
        rlp_list(&[
            rlp_bytes(self.public_key.as_bytes()),
            rlp_uint(self.public_key.algorithm().code()),
            rlp_uint(self.hash_algo.code()),
            rlp_uint(u64::from(self.weight)),
        ])
    }

    pub fn encode_hex(&self) -> String {
        alloy::primitives::hex::encode(self.encode())
    }
}

/// An account this client can sign for.
#[derive(Debug, Clone)]
pub struct SigningAccount {
    pub address: Address,
    pub key_index: u32,
    pub private_key: PrivateKey,
}

/// Settings shared by every workflow.
#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub gas_limit: u64,
    pub poll: PollPolicy,
    pub scripts: ScriptBundle,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            gas_limit: 100,
            poll: PollPolicy::default(),
            scripts: ScriptBundle::embedded(),
        }
    }
}

impl From<&ClientConfig> for ClientSettings {
    fn from(config: &ClientConfig) -> Self {
        Self {
            gas_limit: config.transaction.gas_limit,
            poll: PollPolicy::from_config(&config.confirmation, &config.retries),
            scripts: match &config.scripts.directory {
                Some(dir) => ScriptBundle::with_override_dir(dir),
                None => ScriptBundle::embedded(),
            },
        }
    }
}

/// Client for the account and token workflows.
pub struct FlowClient {
    api: Arc<dyn AccessApi>,
    resolver: KeyResolver,
    submitter: Submitter,
    poller: ConfirmationPoller,
    scripts: ScriptBundle,
    gas_limit: u64,
    signers: HashMap<Address, SigningAccount>,
    cancel: CancellationToken,
}

impl FlowClient {
    pub fn new(api: Arc<dyn AccessApi>, settings: ClientSettings) -> Self {
        Self {
            resolver: KeyResolver::new(api.clone()),
            submitter: Submitter::new(api.clone()),
            poller: ConfirmationPoller::new(api.clone(), settings.poll),
            api,
            scripts: settings.scripts,
            gas_limit: settings.gas_limit,
            signers: HashMap::new(),
            cancel: CancellationToken::new(),
        }
    }

    /// Register an account this client may propose, pay and authorize with.
    pub fn with_signer(mut self, account: SigningAccount) -> Self {
        self.add_signer(account);
        self
    }

    pub fn add_signer(&mut self, account: SigningAccount) {
        self.signers.insert(account.address, account);
    }

    /// Token that aborts any confirmation wait in progress.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn poller(&self) -> &ConfirmationPoller {
        &self.poller
    }

    pub async fn get_account(&self, address: &Address) -> LifecycleResult<Account> {
        self.api.get_account(address).await
    }

    pub async fn get_account_balance(&self, address: &Address) -> LifecycleResult<UFix64> {
        Ok(self.get_account(address).await?.balance)
    }

    /// Create an account holding `key`, paid for by `payer`, and return its
    /// address.
    pub async fn create_account(
        &self,
        payer: Address,
        key: &NewAccountKey,
    ) -> LifecycleResult<Address> {
        let result = self
            .execute(
                scripts::CREATE_ACCOUNT,
                vec![CadenceValue::string(key.encode_hex())],
                payer,
            )
            .await?;

        let address = extract_created_address(&result)?;
        tracing::info!(
            tx_id = %result.transaction_id,
            payer = %payer,
            address = %address,
            "Account created"
        );
        Ok(address)
    }

    /// Transfer `amount` FLOW from `sender` to `recipient`.
    ///
    /// `amount` must carry exactly 8 decimal places (e.g. `"10.00000000"`);
    /// anything else fails before any network call.
    pub async fn transfer_tokens(
        &self,
        sender: Address,
        recipient: Address,
        amount: &str,
    ) -> LifecycleResult<TransactionResult> {
        let amount = UFix64::parse_exact(amount)?;

        let result = self
            .execute(
                scripts::TRANSFER_FLOW,
                vec![CadenceValue::ufix64(amount), CadenceValue::address(&recipient)],
                sender,
            )
            .await?;

        tracing::info!(
            tx_id = %result.transaction_id,
            sender = %sender,
            recipient = %recipient,
            amount = %amount,
            "Tokens transferred"
        );
        Ok(result)
    }

    /// Run `script_name` with `signer` as proposer, payer and sole
    /// authorizer, and wait for the seal.
    ///
    /// A stale-sequence rejection is returned as is; rebuilding is the
    /// caller's decision.
    pub async fn execute(
        &self,
        script_name: &str,
        arguments: Vec<CadenceValue>,
        signer: Address,
    ) -> LifecycleResult<TransactionResult> {
        for argument in &arguments {
            argument.validate_fixed_point()?;
        }
        let account = self.signers.get(&signer).ok_or_else(|| {
            LifecycleError::Signing(format!("No signing key configured for account {}", signer))
        })?;
        let script = self.scripts.load(script_name)?;

        let key = self.resolver.resolve(account.address, account.key_index).await?;
        let reference_block = self.api.get_latest_block_header().await?;

        let transaction = TransactionBuilder::new(script)
            .arguments(arguments)
            .reference_block(reference_block.id)
            .gas_limit(self.gas_limit)
            .proposal_key(&key)
            .payer(account.address)
            .authorizer(account.address)
            .build()?;

        let signed = sign_with_resolved_key(transaction, &key, &account.private_key)?;
        tracing::debug!(
            script = script_name,
            signer = %signer,
            sequence_number = key.sequence_number(),
            reference_height = reference_block.height,
            "Transaction built and signed"
        );

        let tx_id = self.submitter.submit(&signed).await?;
        self.poller.await_seal(&tx_id, &self.cancel).await
    }
}

impl std::fmt::Debug for FlowClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlowClient")
            .field("signers", &self.signers.keys().collect::<Vec<_>>())
            .field("gas_limit", &self.gas_limit)
            .finish_non_exhaustive()
    }
}

/// Generate a fresh key pair for `algorithm`.
pub fn generate_key(algorithm: SignatureAlgorithm) -> (PrivateKey, PublicKey) {
    let private_key = PrivateKey::generate(algorithm);
    let public_key = private_key.public_key();
    (private_key, public_key)
}
