//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use alloy::primitives::hex;
use alloy::rlp::{Decodable, Header};
use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use flow_lifecycle::access::{
    AccessApi, Account, AccountKey, Address, BlockHeader, Event, Identifier, TransactionResult,
    TransactionStatus,
};
use flow_lifecycle::app::{ClientSettings, FlowClient, SigningAccount};
use flow_lifecycle::cadence::{CadenceValue, Composite, Field, UFix64};
use flow_lifecycle::crypto::{HashAlgorithm, PrivateKey, SignatureAlgorithm};
use flow_lifecycle::lifecycle::PollPolicy;
use flow_lifecycle::resilience::Backoff;
use flow_lifecycle::scripts::ScriptBundle;
use flow_lifecycle::transaction::SignedTransaction;
use flow_lifecycle::{LifecycleError, LifecycleResult};

pub const SERVICE_ADDRESS: &str = "f8d6e0586b0a20c7";
pub const SERVICE_BALANCE: &str = "1000.00000000";

pub fn service_address() -> Address {
    SERVICE_ADDRESS.parse().unwrap()
}

/// Per-operation call counters.
#[derive(Debug, Default)]
pub struct CallCounters {
    pub get_account: AtomicU32,
    pub get_block: AtomicU32,
    pub send: AtomicU32,
    pub get_result: AtomicU32,
}

impl CallCounters {
    pub fn total(&self) -> u32 {
        self.get_account.load(Ordering::SeqCst)
            + self.get_block.load(Ordering::SeqCst)
            + self.send.load(Ordering::SeqCst)
            + self.get_result.load(Ordering::SeqCst)
    }

    pub fn results(&self) -> u32 {
        self.get_result.load(Ordering::SeqCst)
    }

    pub fn sends(&self) -> u32 {
        self.send.load(Ordering::SeqCst)
    }
}

struct MockTransaction {
    pending: VecDeque<TransactionStatus>,
    current: TransactionStatus,
    error_message: String,
    events: Vec<Event>,
}

struct MockState {
    accounts: HashMap<Address, Account>,
    transactions: HashMap<Identifier, MockTransaction>,
    block: BlockHeader,
    next_address: u64,
    progression: Vec<TransactionStatus>,
    failing_status_queries: u32,
    reject_next: Option<String>,
}

/// In-memory network: accounts, sequence numbers, signature checks, account
/// creation and FLOW transfers, with scripted status progressions and
/// failure injection.
pub struct MockNetwork {
    state: Mutex<MockState>,
    pub calls: CallCounters,
}

fn default_progression() -> Vec<TransactionStatus> {
    vec![
        TransactionStatus::Pending,
        TransactionStatus::Finalized,
        TransactionStatus::Executed,
        TransactionStatus::Sealed,
    ]
}

impl MockNetwork {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(MockState {
                accounts: HashMap::new(),
                transactions: HashMap::new(),
                block: BlockHeader {
                    id: Identifier::from([0xb1; 32]),
                    parent_id: Identifier::from([0xb0; 32]),
                    height: 100,
                },
                next_address: 0x01cf0e2f2f715450,
                progression: default_progression(),
                failing_status_queries: 0,
                reject_next: None,
            }),
            calls: CallCounters::default(),
        })
    }

    /// Register an account with a single full-weight key at index 0.
    pub fn add_account(
        &self,
        address: Address,
        balance: &str,
        private_key: &PrivateKey,
        hash_algo: HashAlgorithm,
    ) {
        let key = AccountKey {
            index: 0,
            public_key: private_key.public_key().as_bytes().to_vec(),
            sign_algo: private_key.algorithm(),
            hash_algo,
            weight: 1000,
            sequence_number: 0,
            revoked: false,
        };
        self.state.lock().unwrap().accounts.insert(
            address,
            Account {
                address,
                balance: balance.parse().unwrap(),
                keys: vec![key],
            },
        );
    }

    pub fn account(&self, address: &Address) -> Option<Account> {
        self.state.lock().unwrap().accounts.get(address).cloned()
    }

    pub fn sequence_number(&self, address: &Address, key_index: u32) -> u64 {
        self.account(address)
            .and_then(|a| a.key(key_index).map(|k| k.sequence_number))
            .unwrap()
    }

    /// Simulate another proposer consuming the key's current sequence number.
    pub fn bump_sequence_number(&self, address: &Address, key_index: u32) {
        let mut state = self.state.lock().unwrap();
        let account = state.accounts.get_mut(address).unwrap();
        let key = account.keys.iter_mut().find(|k| k.index == key_index).unwrap();
        key.sequence_number += 1;
    }

    pub fn revoke_key(&self, address: &Address, key_index: u32) {
        let mut state = self.state.lock().unwrap();
        let account = state.accounts.get_mut(address).unwrap();
        let key = account.keys.iter_mut().find(|k| k.index == key_index).unwrap();
        key.revoked = true;
    }

    /// Statuses reported, one per query, for transactions submitted from now
    /// on. The last status repeats.
    pub fn set_progression(&self, statuses: Vec<TransactionStatus>) {
        self.state.lock().unwrap().progression = statuses;
    }

    /// Fail the next `count` status queries with a transport error.
    pub fn fail_status_queries(&self, count: u32) {
        self.state.lock().unwrap().failing_status_queries = count;
    }

    pub fn reject_next_submission(&self, reason: &str) {
        self.state.lock().unwrap().reject_next = Some(reason.to_string());
    }

    /// Make `id` known without submitting anything.
    pub fn insert_transaction(
        &self,
        id: Identifier,
        statuses: Vec<TransactionStatus>,
        error_message: &str,
    ) {
        self.state.lock().unwrap().transactions.insert(
            id,
            MockTransaction {
                pending: statuses.into(),
                current: TransactionStatus::Unknown,
                error_message: error_message.to_string(),
                events: Vec::new(),
            },
        );
    }

    fn verify_signatures(state: &MockState, signed: &SignedTransaction) -> Result<(), String> {
        let message = signed.transaction().envelope_message();
        for sig in signed.envelope_signatures() {
            let account = state
                .accounts
                .get(&sig.address)
                .ok_or_else(|| format!("signer account {} does not exist", sig.address))?;
            let key = account
                .key(sig.key_index)
                .ok_or_else(|| format!("signer key {} does not exist", sig.key_index))?;
            let public_key =
                flow_lifecycle::crypto::PublicKey::from_bytes(&key.public_key, key.sign_algo)
                    .map_err(|e| e.to_string())?;
            if !public_key.verify(key.hash_algo, &message, &sig.signature) {
                return Err(format!(
                    "invalid signature for account {} key {}",
                    sig.address, sig.key_index
                ));
            }
        }
        Ok(())
    }

    fn execute(
        state: &mut MockState,
        signed: &SignedTransaction,
    ) -> Result<Vec<Event>, String> {
        let tx = signed.transaction();
        let script = String::from_utf8_lossy(tx.script()).to_string();
        let arguments: Vec<CadenceValue> = tx
            .arguments()
            .iter()
            .map(|a| CadenceValue::decode(a).unwrap())
            .collect();

        if script.contains("AuthAccount(payer") {
            let CadenceValue::String(encoded) = &arguments[0] else {
                return Err("expected a String public key argument".into());
            };
            let key = decode_account_key(encoded);
            let address = Address::from(state.next_address);
            state.next_address += 1;
            state.accounts.insert(
                address,
                Account {
                    address,
                    balance: UFix64::ZERO,
                    keys: vec![key],
                },
            );
            return Ok(vec![event(
                "flow.AccountCreated",
                vec![("address", CadenceValue::address(&address))],
            )]);
        }

        if script.contains("FlowToken") {
            let (CadenceValue::UFix64(raw), CadenceValue::Address(to)) =
                (&arguments[0], &arguments[1])
            else {
                return Err("expected (UFix64, Address) arguments".into());
            };
            let amount = UFix64::parse_exact(raw).map_err(|e| e.to_string())?;
            let from = tx.authorizers()[0];
            let to: Address = to.parse().map_err(|e: LifecycleError| e.to_string())?;

            let sender_balance = state.accounts.get(&from).map(|a| a.balance).unwrap_or(UFix64::ZERO);
            let remaining = sender_balance.checked_sub(amount).ok_or_else(|| {
                "Amount withdrawn must be less than or equal than the balance of the Vault"
                    .to_string()
            })?;
            if !state.accounts.contains_key(&to) {
                return Err("Could not borrow receiver reference to the recipient's Vault".into());
            }

            state.accounts.get_mut(&from).unwrap().balance = remaining;
            let recipient = state.accounts.get_mut(&to).unwrap();
            recipient.balance = recipient.balance.checked_add(amount).unwrap();

            return Ok(vec![
                event(
                    "A.0ae53cb6e3f42a79.FlowToken.TokensWithdrawn",
                    vec![("amount", CadenceValue::ufix64(amount))],
                ),
                event(
                    "A.0ae53cb6e3f42a79.FlowToken.TokensDeposited",
                    vec![("amount", CadenceValue::ufix64(amount))],
                ),
            ]);
        }

        Ok(Vec::new())
    }
}

fn event(event_type: &str, fields: Vec<(&str, CadenceValue)>) -> Event {
    let value = CadenceValue::Event(Composite {
        id: event_type.to_string(),
        fields: fields
            .into_iter()
            .map(|(name, value)| Field {
                name: name.to_string(),
                value,
            })
            .collect(),
    });
    Event {
        event_type: event_type.to_string(),
        transaction_index: 0,
        event_index: 0,
        payload: value.encode().unwrap(),
    }
}

fn take_string(buf: &mut &[u8]) -> Vec<u8> {
    let header = Header::decode(buf).unwrap();
    assert!(!header.list);
    let (item, rest) = buf.split_at(header.payload_length);
    *buf = rest;
    item.to_vec()
}

/// Decode `RLP([public_key, sign_algo, hash_algo, weight])` hex.
pub fn decode_account_key(encoded: &str) -> AccountKey {
    let bytes = hex::decode(encoded).unwrap();
    let mut buf = bytes.as_slice();
    let header = Header::decode(&mut buf).unwrap();
    assert!(header.list);

    let public_key = take_string(&mut buf);
    let sign_algo = u64::decode(&mut buf).unwrap();
    let hash_algo = u64::decode(&mut buf).unwrap();
    let weight = u64::decode(&mut buf).unwrap();

    AccountKey {
        index: 0,
        public_key,
        sign_algo: SignatureAlgorithm::from_code(sign_algo).unwrap(),
        hash_algo: HashAlgorithm::from_code(hash_algo).unwrap(),
        weight: weight as u32,
        sequence_number: 0,
        revoked: false,
    }
}

#[async_trait]
impl AccessApi for MockNetwork {
    async fn get_account(&self, address: &Address) -> LifecycleResult<Account> {
        self.calls.get_account.fetch_add(1, Ordering::SeqCst);
        self.account(address)
            .ok_or_else(|| LifecycleError::NotFound(format!("Account {} not found", address)))
    }

    async fn get_latest_block_header(&self) -> LifecycleResult<BlockHeader> {
        self.calls.get_block.fetch_add(1, Ordering::SeqCst);
        Ok(self.state.lock().unwrap().block.clone())
    }

    async fn send_transaction(&self, signed: &SignedTransaction) -> LifecycleResult<Identifier> {
        self.calls.send.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.lock().unwrap();

        if let Some(reason) = state.reject_next.take() {
            return Err(LifecycleError::rejected(reason));
        }

        let tx = signed.transaction();
        let proposal = *tx.proposal_key();
        let current = state
            .accounts
            .get(&proposal.address)
            .and_then(|a| a.key(proposal.key_index))
            .map(|k| k.sequence_number)
            .ok_or_else(|| LifecycleError::rejected("invalid proposal key: account or key not found"))?;
        if current != proposal.sequence_number {
            return Err(LifecycleError::rejected(format!(
                "[Error Code: 1007] invalid proposal key: public key {} on account {} has sequence number {}, but given {}",
                proposal.key_index, proposal.address, current, proposal.sequence_number
            )));
        }
        if !signed.has_signature_from(&tx.payer()) {
            return Err(LifecycleError::rejected("missing payer envelope signature"));
        }
        Self::verify_signatures(&state, signed).map_err(LifecycleError::rejected)?;

        // The sequence number is consumed even if execution fails.
        let account = state.accounts.get_mut(&proposal.address).unwrap();
        let key = account.keys.iter_mut().find(|k| k.index == proposal.key_index).unwrap();
        key.sequence_number += 1;

        let (events, error_message) = match Self::execute(&mut state, signed) {
            Ok(events) => (events, String::new()),
            Err(message) => (Vec::new(), format!("[Error Code: 1101] cadence runtime error: {}", message)),
        };

        let id = signed.id();
        let pending = state.progression.clone().into();
        state.transactions.insert(
            id,
            MockTransaction {
                pending,
                current: TransactionStatus::Unknown,
                error_message,
                events,
            },
        );
        Ok(id)
    }

    async fn get_transaction_result(&self, id: &Identifier) -> LifecycleResult<TransactionResult> {
        self.calls.get_result.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.lock().unwrap();

        if state.failing_status_queries > 0 {
            state.failing_status_queries -= 1;
            return Err(LifecycleError::Access("injected: connection reset".to_string()));
        }

        let block_id = state.block.id;
        let tx = state
            .transactions
            .get_mut(id)
            .ok_or_else(|| LifecycleError::NotFound(format!("Transaction {} not found", id)))?;
        if let Some(next) = tx.pending.pop_front() {
            tx.current = next;
        }

        let executed = matches!(
            tx.current,
            TransactionStatus::Executed | TransactionStatus::Sealed
        );
        Ok(TransactionResult {
            transaction_id: *id,
            status: tx.current,
            status_code: if executed && !tx.error_message.is_empty() { 1 } else { 0 },
            error_message: if executed { tx.error_message.clone() } else { String::new() },
            events: if executed { tx.events.clone() } else { Vec::new() },
            block_id: (tx.current != TransactionStatus::Pending).then_some(block_id),
        })
    }
}

/// Fast polling for tests.
pub fn test_policy() -> PollPolicy {
    PollPolicy {
        interval: Duration::from_millis(10),
        max_attempts: 50,
        timeout: Duration::from_secs(5),
        backoff: Backoff::new(5, 20),
    }
}

pub fn test_settings() -> ClientSettings {
    ClientSettings {
        gas_limit: 100,
        poll: test_policy(),
        scripts: ScriptBundle::embedded(),
    }
}

/// A network with a funded service account and a client signing for it.
pub fn service_setup() -> (Arc<MockNetwork>, FlowClient) {
    let network = MockNetwork::new();
    let private_key = PrivateKey::generate(SignatureAlgorithm::EcdsaP256);
    network.add_account(
        service_address(),
        SERVICE_BALANCE,
        &private_key,
        HashAlgorithm::Sha3_256,
    );

    let client = FlowClient::new(network.clone(), test_settings()).with_signer(SigningAccount {
        address: service_address(),
        key_index: 0,
        private_key,
    });
    (network, client)
}

/// Start a mock access API on an ephemeral port. `f` receives the request
/// method and path (with query) and returns status and JSON body.
pub async fn start_programmable_backend<F, Fut>(f: F) -> SocketAddr
where
    F: Fn(String, String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        let Some((method, path)) = read_request(&mut socket).await else {
                            return;
                        };
                        let (status, body) = f(method, path).await;
                        let status_text = match status {
                            200 => "200 OK",
                            400 => "400 Bad Request",
                            404 => "404 Not Found",
                            500 => "500 Internal Server Error",
                            503 => "503 Service Unavailable",
                            _ => "200 OK",
                        };

                        let response_str = format!(
                            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response_str.as_bytes()).await;
                        let _ = socket.shutdown().await;
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// Read one request fully (headers and body) and return method and target.
async fn read_request(socket: &mut tokio::net::TcpStream) -> Option<(String, String)> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let content_length = head
        .lines()
        .find_map(|line| {
            let (name, value) = line.split_once(':')?;
            name.eq_ignore_ascii_case("content-length")
                .then(|| value.trim().parse::<usize>().ok())
                .flatten()
        })
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    let mut request_line = head.lines().next()?.split_whitespace();
    let method = request_line.next()?.to_string();
    let path = request_line.next()?.to_string();
    Some((method, path))
}
