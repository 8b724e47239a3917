use std::collections::{HashMap, HashSet, VecDeque};

use evm_interpreter::{
	keccak256, AccessStatus, CallKind, CallRequest, CallResponse, Config, Error, Host,
	Interpreter, Revision, RunParams, RunResult, Status, StepState, StorageStatus,
};
use primitive_types::{H160, H256, U256};

fn recipient() -> H160 {
	H160::repeat_byte(0x11)
}

fn sender() -> H160 {
	H160::repeat_byte(0x22)
}

#[derive(Clone, Debug, Default)]
struct Account {
	balance: U256,
	nonce: u64,
	code: Vec<u8>,
}

/// World-state double that records every interaction.
#[derive(Default)]
struct TestHost {
	accounts: HashMap<H160, Account>,
	storage: HashMap<(H160, H256), H256>,
	committed: HashMap<(H160, H256), H256>,
	transient: HashMap<(H160, H256), H256>,
	warm_accounts: HashSet<H160>,
	warm_slots: HashSet<(H160, H256)>,
	logs: Vec<(H160, Vec<H256>, Vec<u8>)>,
	destructed: HashSet<H160>,
	snapshots: Vec<(
		HashMap<(H160, H256), H256>,
		HashMap<(H160, H256), H256>,
		HashMap<H160, Account>,
	)>,
	calls: Vec<CallRequest>,
	responses: VecDeque<CallResponse>,
	/// Storage write applied inside `call`, to exercise snapshot rollback.
	mutate_on_call: Option<(H160, H256, H256)>,
}

impl Host for TestHost {
	fn account_exists(&self, address: H160) -> bool {
		self.accounts.contains_key(&address)
	}

	fn balance(&self, address: H160) -> U256 {
		self.accounts
			.get(&address)
			.map(|account| account.balance)
			.unwrap_or_default()
	}

	fn set_balance(&mut self, address: H160, balance: U256) {
		self.accounts.entry(address).or_default().balance = balance;
	}

	fn nonce(&self, address: H160) -> u64 {
		self.accounts
			.get(&address)
			.map(|account| account.nonce)
			.unwrap_or_default()
	}

	fn set_nonce(&mut self, address: H160, nonce: u64) {
		self.accounts.entry(address).or_default().nonce = nonce;
	}

	fn code(&self, address: H160) -> Vec<u8> {
		self.accounts
			.get(&address)
			.map(|account| account.code.clone())
			.unwrap_or_default()
	}

	fn code_hash(&self, address: H160) -> H256 {
		keccak256(&self.code(address))
	}

	fn code_size(&self, address: H160) -> u64 {
		self.code(address).len() as u64
	}

	fn set_code(&mut self, address: H160, code: Vec<u8>) {
		self.accounts.entry(address).or_default().code = code;
	}

	fn storage(&self, address: H160, key: H256) -> H256 {
		self.storage.get(&(address, key)).copied().unwrap_or_default()
	}

	fn set_storage(&mut self, address: H160, key: H256, value: H256) -> StorageStatus {
		let original = self.committed_storage(address, key);
		let current = self.storage(address, key);
		let status = StorageStatus::from_values(original, current, value);
		self.storage.insert((address, key), value);
		status
	}

	fn committed_storage(&self, address: H160, key: H256) -> H256 {
		self.committed.get(&(address, key)).copied().unwrap_or_default()
	}

	fn transient_storage(&self, address: H160, key: H256) -> H256 {
		self.transient.get(&(address, key)).copied().unwrap_or_default()
	}

	fn set_transient_storage(&mut self, address: H160, key: H256, value: H256) {
		self.transient.insert((address, key), value);
	}

	fn access_account(&mut self, address: H160) -> AccessStatus {
		if self.warm_accounts.insert(address) {
			AccessStatus::Cold
		} else {
			AccessStatus::Warm
		}
	}

	fn access_storage(&mut self, address: H160, key: H256) -> AccessStatus {
		if self.warm_slots.insert((address, key)) {
			AccessStatus::Cold
		} else {
			AccessStatus::Warm
		}
	}

	fn is_address_in_access_list(&self, address: H160) -> bool {
		self.warm_accounts.contains(&address)
	}

	fn is_slot_in_access_list(&self, address: H160, key: H256) -> bool {
		self.warm_slots.contains(&(address, key))
	}

	fn snapshot(&mut self) -> u64 {
		self.snapshots.push((
			self.storage.clone(),
			self.transient.clone(),
			self.accounts.clone(),
		));
		self.snapshots.len() as u64 - 1
	}

	fn restore_snapshot(&mut self, snapshot: u64) {
		let (storage, transient, accounts) = self.snapshots[snapshot as usize].clone();
		self.storage = storage;
		self.transient = transient;
		self.accounts = accounts;
		self.snapshots.truncate(snapshot as usize);
	}

	fn emit_log(&mut self, address: H160, topics: &[H256], data: &[u8]) {
		self.logs.push((address, topics.to_vec(), data.to_vec()));
	}

	fn self_destruct(&mut self, address: H160, beneficiary: H160) -> bool {
		let balance = self.balance(address);
		let beneficiary_balance = self.balance(beneficiary);
		self.set_balance(beneficiary, beneficiary_balance + balance);
		self.set_balance(address, U256::zero());
		self.destructed.insert(address)
	}

	fn has_self_destructed(&self, address: H160) -> bool {
		self.destructed.contains(&address)
	}

	fn block_hash(&self, number: u64) -> H256 {
		H256::from_low_u64_be(number ^ 0xdead)
	}

	fn call(&mut self, request: CallRequest) -> CallResponse {
		let snapshot = self.snapshot();
		if let Some((address, key, value)) = self.mutate_on_call {
			let _ = self.set_storage(address, key, value);
		}
		let response = self.responses.pop_front().unwrap_or(CallResponse {
			success: true,
			..CallResponse::default()
		});
		if !response.success {
			self.restore_snapshot(snapshot);
		}
		self.calls.push(request);
		response
	}
}

fn engine() -> Interpreter {
	Interpreter::new(Config::default()).unwrap()
}

fn params<'a>(code: &'a [u8], gas: i64, revision: Revision) -> RunParams<'a> {
	RunParams {
		revision,
		code,
		code_hash: None,
		gas,
		input: &[],
		sender: sender(),
		recipient: recipient(),
		value: U256::zero(),
		is_static: false,
		depth: 0,
		block: Default::default(),
		transaction: Default::default(),
	}
}

fn run_code(code_hex: &str, gas: i64, revision: Revision) -> (RunResult, TestHost) {
	let code = hex::decode(code_hex).unwrap();
	let mut host = TestHost::default();
	let result = engine().run(&params(&code, gas, revision), &mut host).unwrap();
	(result, host)
}

#[test]
fn empty_code_is_a_no_op() {
	let mut host = TestHost::default();
	let result = engine()
		.run(&params(&[], 1_000_000, Revision::CANCUN), &mut host)
		.unwrap();
	assert!(result.success);
	assert!(result.output.is_empty());
	assert_eq!(result.gas_left, 1_000_000);
	assert_eq!(result.gas_refund, 0);
}

#[test]
fn simple_arithmetic_returns_a_word() {
	// PUSH1 3; PUSH1 2; ADD; PUSH1 0; MSTORE; PUSH1 32; PUSH1 0; RETURN
	let (result, _) = run_code("600360020160005260206000f3", 100_000, Revision::CANCUN);
	assert!(result.success);
	assert_eq!(result.output, {
		let mut expected = [0u8; 32];
		expected[31] = 5;
		expected
	});
	// Seven cheap instructions plus one word of memory.
	assert_eq!(result.gas_left, 100_000 - 24);
}

#[test]
fn jump_to_a_valid_destination() {
	// PUSH1 4; JUMP; STOP; JUMPDEST; STOP
	let (result, _) = run_code("600456005b00", 100_000, Revision::CANCUN);
	assert!(result.success);
	assert_eq!(result.gas_left, 100_000 - 12);
}

#[test]
fn jump_to_a_non_destination_fails() {
	// Same shape, but the target is the STOP at position 3.
	let (result, _) = run_code("600356005b00", 100_000, Revision::CANCUN);
	assert!(!result.success);
	assert_eq!(result.gas_left, 0);
	assert!(result.output.is_empty());
}

#[test]
fn push_data_does_not_hide_a_destination() {
	// PUSH2 0x5b00; JUMP: the 0x5b is immediate data, and the target is far
	// out of range anyway.
	let (result, _) = run_code("615b0056", 100_000, Revision::CANCUN);
	assert!(!result.success);
	assert_eq!(result.gas_left, 0);
}

#[test]
fn revert_preserves_remaining_gas() {
	// PUSH1 0; PUSH1 0; REVERT
	let (result, _) = run_code("60006000fd", 100, Revision::CANCUN);
	assert!(!result.success);
	assert!(result.output.is_empty());
	assert_eq!(result.gas_left, 94);
	assert_eq!(result.gas_refund, 0);
}

#[test]
fn unsupported_revision_is_rejected_before_execution() {
	let newer = Revision(Revision::NEWEST_SUPPORTED.0 + 1);
	let mut host = TestHost::default();
	let result = engine().run(&params(&[0x00], 1_000, newer), &mut host);
	assert_eq!(result.err(), Some(Error::UnsupportedRevision(newer)));
}

#[test]
fn invalid_and_unassigned_opcodes_fail() {
	for code in ["fe", "0c", "21"] {
		let (result, _) = run_code(code, 10_000, Revision::CANCUN);
		assert!(!result.success, "code {code}");
		assert_eq!(result.gas_left, 0, "code {code}");
	}
}

#[test]
fn stack_underflow_fails() {
	// ADD on an empty stack.
	let (result, _) = run_code("01", 10_000, Revision::CANCUN);
	assert!(!result.success);
	assert_eq!(result.gas_left, 0);
}

#[test]
fn out_of_gas_mid_run() {
	// Three PUSH1 need 9 gas.
	let (result, _) = run_code("600160016001", 8, Revision::CANCUN);
	assert!(!result.success);
	assert_eq!(result.gas_left, 0);
}

#[test]
fn exponentiation_charges_per_exponent_byte() {
	// PUSH1 2; PUSH1 10; EXP; PUSH1 0; MSTORE; PUSH1 32; PUSH1 0; RETURN
	let (result, _) = run_code("6002600a0a60005260206000f3", 100_000, Revision::CANCUN);
	assert!(result.success);
	assert_eq!(U256::from_big_endian(&result.output), U256::from(100));
	// 6 + 10 + 50 for the one-byte exponent, then the return plumbing.
	assert_eq!(result.gas_left, 100_000 - 81);
}

#[test]
fn memory_growth_charges_the_quadratic_total() {
	// PUSH1 95; MLOAD; STOP: touches bytes up to 127, i.e. four words.
	let (result, _) = run_code("605f5100", 1_000, Revision::CANCUN);
	assert!(result.success);
	// 3 + 3 static, plus C(4) = 3*4 + 4*4/512 = 12.
	assert_eq!(result.gas_left, 1_000 - 18);
}

#[test]
fn sha3_hashes_memory() {
	// PUSH1 32; PUSH1 0; SHA3; PUSH1 0; MSTORE; PUSH1 32; PUSH1 0; RETURN
	let (result, _) = run_code("602060002060005260206000f3", 100_000, Revision::CANCUN);
	assert!(result.success);
	assert_eq!(result.output, keccak256(&[0u8; 32]).as_bytes());
}

#[test]
fn sstore_charges_cold_slot_and_fresh_write() {
	// PUSH1 1; PUSH1 0; SSTORE
	let (result, host) = run_code("6001600055", 30_000, Revision::LONDON);
	assert!(result.success);
	// 6 for the pushes, 2100 cold slot, 20000 for a fresh non-zero write.
	assert_eq!(result.gas_left, 30_000 - 6 - 2_100 - 20_000);
	assert_eq!(result.gas_refund, 0);
	assert_eq!(
		host.storage.get(&(recipient(), H256::zero())).copied(),
		Some(H256::from_low_u64_be(1))
	);
}

#[test]
fn sstore_clearing_a_slot_refunds() {
	let code = hex::decode("6000600055").unwrap(); // PUSH1 0; PUSH1 0; SSTORE
	let mut host = TestHost::default();
	let slot = (recipient(), H256::zero());
	host.committed.insert(slot, H256::from_low_u64_be(1));
	host.storage.insert(slot, H256::from_low_u64_be(1));

	let result = engine()
		.run(&params(&code, 30_000, Revision::LONDON), &mut host)
		.unwrap();
	assert!(result.success);
	// 6 for the pushes, 2100 cold slot, 2900 reset.
	assert_eq!(result.gas_left, 30_000 - 6 - 2_100 - 2_900);
	assert_eq!(result.gas_refund, 4_800);
}

#[test]
fn sstore_refund_is_larger_before_london() {
	let code = hex::decode("6000600055").unwrap();
	let mut host = TestHost::default();
	let slot = (recipient(), H256::zero());
	host.committed.insert(slot, H256::from_low_u64_be(1));
	host.storage.insert(slot, H256::from_low_u64_be(1));

	let result = engine()
		.run(&params(&code, 30_000, Revision::BERLIN), &mut host)
		.unwrap();
	assert!(result.success);
	assert_eq!(result.gas_refund, 15_000);
}

#[test]
fn sstore_under_istanbul_uses_flat_costs() {
	let (result, _) = run_code("6001600055", 30_000, Revision::ISTANBUL);
	assert!(result.success);
	// No access lists yet: 6 for the pushes plus the 20000 fresh write.
	assert_eq!(result.gas_left, 30_000 - 6 - 20_000);
}

#[test]
fn sstore_gas_sentry_rejects_poor_frames() {
	let (result, _) = run_code("6001600055", 2_306, Revision::LONDON);
	assert!(!result.success);
	assert_eq!(result.gas_left, 0);
}

#[test]
fn static_frames_protect_state() {
	let code = hex::decode("6001600055").unwrap();
	let mut host = TestHost::default();
	let mut p = params(&code, 30_000, Revision::CANCUN);
	p.is_static = true;

	let result = engine().run(&p, &mut host).unwrap();
	assert!(!result.success);
	assert_eq!(result.gas_left, 0);
	assert!(host.storage.is_empty());
}

#[test]
fn value_bearing_call_is_write_protected() {
	// PUSH1 0 x4; PUSH1 1 (value); PUSH1 0xbb; PUSH2 0xffff; CALL
	let code = hex::decode("6000600060006000600160bb61fffff1").unwrap();
	let mut host = TestHost::default();
	let mut p = params(&code, 100_000, Revision::CANCUN);
	p.is_static = true;

	let result = engine().run(&p, &mut host).unwrap();
	assert!(!result.success);
	assert_eq!(result.gas_left, 0);
	assert!(host.calls.is_empty());
}

#[test]
fn transient_storage_round_trips() {
	// PUSH1 7; PUSH1 1; TSTORE; PUSH1 1; TLOAD; PUSH1 0; MSTORE;
	// PUSH1 32; PUSH1 0; RETURN
	let (result, host) = run_code("600760015d60015c60005260206000f3", 100_000, Revision::CANCUN);
	assert!(result.success);
	assert_eq!(U256::from_big_endian(&result.output), U256::from(7));
	assert_eq!(host.transient.len(), 1);
}

#[test]
fn tstore_is_not_available_before_cancun() {
	let (result, _) = run_code("600760015d", 100_000, Revision::SHANGHAI);
	assert!(!result.success);
	assert_eq!(result.gas_left, 0);
}

#[test]
fn push0_follows_its_revision_gate() {
	let (rejected, _) = run_code("5f00", 1_000, Revision::PARIS);
	assert!(!rejected.success);

	let (accepted, _) = run_code("5f00", 1_000, Revision::SHANGHAI);
	assert!(accepted.success);
	assert_eq!(accepted.gas_left, 1_000 - 2);
}

#[test]
fn clz_is_an_osaka_opcode() {
	// PUSH1 1; CLZ; PUSH1 0; MSTORE; PUSH1 32; PUSH1 0; RETURN
	let code = "60011e60005260206000f3";

	let (rejected, _) = run_code(code, 100_000, Revision::PRAGUE);
	assert!(!rejected.success);

	let (accepted, _) = run_code(code, 100_000, Revision::OSAKA);
	assert!(accepted.success);
	assert_eq!(U256::from_big_endian(&accepted.output), U256::from(255));
}

#[test]
fn mcopy_moves_memory() {
	// PUSH1 0x42; PUSH1 0; MSTORE8; PUSH1 1; PUSH1 0; PUSH1 31; MCOPY;
	// PUSH1 0; MLOAD; PUSH1 0; MSTORE; PUSH1 32; PUSH1 0; RETURN
	let (result, _) = run_code(
		"604260005360016000601f5e60005160005260206000f3",
		100_000,
		Revision::CANCUN,
	);
	assert!(result.success);
	let mut expected = [0u8; 32];
	expected[0] = 0x42;
	expected[31] = 0x42;
	assert_eq!(result.output, expected);
}

#[test]
fn logs_reach_the_host() {
	// PUSH1 0xaa (topic); PUSH1 2 (len); PUSH1 0 (offset); LOG1
	let (result, host) = run_code("60aa60026000a1", 100_000, Revision::CANCUN);
	assert!(result.success);
	// Pushes, static 375, one topic 375, two data bytes 16, one word 3.
	assert_eq!(result.gas_left, 100_000 - 9 - 375 - 375 - 16 - 3);

	let (address, topics, data) = &host.logs[0];
	assert_eq!(*address, recipient());
	assert_eq!(topics.as_slice(), &[H256::from_low_u64_be(0xaa)]);
	assert_eq!(data.as_slice(), &[0, 0]);
}

#[test]
fn call_forwards_gas_under_the_63_64_rule() {
	// PUSH1 0 x4; PUSH1 0 (value); PUSH1 0xbb; PUSH2 0xffff; CALL; STOP
	let code = hex::decode("6000600060006000600060bb61fffff100").unwrap();
	let mut host = TestHost::default();
	host.responses.push_back(CallResponse {
		success: true,
		output: vec![1, 2, 3],
		gas_left: 65_000,
		gas_refund: 7,
		created_address: H160::zero(),
	});

	let result = engine()
		.run(&params(&code, 100_000, Revision::CANCUN), &mut host)
		.unwrap();
	assert!(result.success);

	let request = &host.calls[0];
	assert_eq!(request.kind, CallKind::Call);
	assert_eq!(request.recipient, H160::from_low_u64_be(0xbb));
	assert_eq!(request.sender, recipient());
	assert_eq!(request.depth, 1);
	assert!(request.input.is_empty());
	// 21 gas of pushes and 2600 for the cold account leave 97379; the
	// request asked for less than 63/64 of that.
	assert_eq!(request.gas, 0xffff);

	assert_eq!(result.gas_left, 97_379 - 0xffff + 65_000);
	assert_eq!(result.gas_refund, 7);
}

#[test]
fn call_caps_the_requested_gas() {
	// Same call, but requesting far more gas than available.
	let code = hex::decode("6000600060006000600060bb620ffffff100").unwrap();
	let mut host = TestHost::default();

	let result = engine()
		.run(&params(&code, 100_000, Revision::CANCUN), &mut host)
		.unwrap();
	assert!(result.success);

	// Pushes cost 21 and the cold account 2600: 97379 left, of which all
	// but one 64th is forwarded.
	let expected = 97_379 - 97_379 / 64;
	assert_eq!(host.calls[0].gas, expected);
	assert_eq!(result.gas_left, 97_379 - expected);
}

#[test]
fn call_with_insufficient_balance_short_circuits() {
	// PUSH1 0 x4; PUSH1 1 (value); PUSH1 0xbb; PUSH2 0xffff; CALL; STOP
	let code = hex::decode("6000600060006000600160bb61fffff100").unwrap();
	let mut host = TestHost::default();

	let result = engine()
		.run(&params(&code, 100_000, Revision::CANCUN), &mut host)
		.unwrap();
	assert!(result.success);
	assert!(host.calls.is_empty(), "the call must not be forwarded");
	// The frame pays the value surcharge and the empty-account cost but
	// keeps the stipend and the would-be endowment.
	assert_eq!(
		result.gas_left,
		100_000 - 21 - 2_600 - 9_000 - 25_000 + 2_300
	);
}

#[test]
fn failed_nested_call_rolls_back_through_snapshots() {
	let code = hex::decode("6000600060006000600060bb61fffff100").unwrap();
	let mut host = TestHost::default();
	let slot = (recipient(), H256::repeat_byte(9));
	host.mutate_on_call = Some((slot.0, slot.1, H256::from_low_u64_be(5)));
	host.responses.push_back(CallResponse::default()); // failure

	let result = engine()
		.run(&params(&code, 100_000, Revision::CANCUN), &mut host)
		.unwrap();
	assert!(result.success, "the caller frame itself keeps running");
	assert!(
		!host.storage.contains_key(&slot),
		"the child's write must be rolled back"
	);
}

#[test]
fn delegatecall_keeps_caller_and_value() {
	// PUSH1 0 x4; PUSH1 0xbb; PUSH2 0xffff; DELEGATECALL; STOP
	let code = hex::decode("600060006000600060bb61fffff400").unwrap();
	let mut host = TestHost::default();
	let mut p = params(&code, 100_000, Revision::CANCUN);
	p.value = U256::from(99);

	let result = engine().run(&p, &mut host).unwrap();
	assert!(result.success);

	let request = &host.calls[0];
	assert_eq!(request.kind, CallKind::DelegateCall);
	assert_eq!(request.recipient, recipient());
	assert_eq!(request.sender, sender());
	assert_eq!(request.value, U256::from(99));
	assert_eq!(request.code_address, H160::from_low_u64_be(0xbb));
}

#[test]
fn staticcall_runs_the_callee_read_only() {
	let code = hex::decode("600060006000600060bb61fffffa00").unwrap();
	let mut host = TestHost::default();

	let result = engine()
		.run(&params(&code, 100_000, Revision::CANCUN), &mut host)
		.unwrap();
	assert!(result.success);
	assert!(host.calls[0].is_static);
	assert_eq!(host.calls[0].value, U256::zero());
}

#[test]
fn call_output_lands_in_memory_and_return_data() {
	// PUSH1 2 (ret_len); PUSH1 0 x3; PUSH1 0 (value); PUSH1 0xbb;
	// PUSH2 0xffff; CALL; PUSH1 32; PUSH1 0; RETURN
	let code = hex::decode("6002600060006000600060bb61fffff160206000f3").unwrap();
	let mut host = TestHost::default();
	host.responses.push_back(CallResponse {
		success: true,
		output: vec![0xde, 0xad, 0xbe, 0xef],
		gas_left: 0,
		gas_refund: 0,
		created_address: H160::zero(),
	});

	let result = engine()
		.run(&params(&code, 100_000, Revision::CANCUN), &mut host)
		.unwrap();
	assert!(result.success);
	// Only ret_len bytes of the response land in memory.
	assert_eq!(&result.output[..2], &[0xde, 0xad]);
	assert_eq!(&result.output[2..], &[0u8; 30]);
}

#[test]
fn create_forwards_all_but_one_64th() {
	// PUSH1 0 (len); PUSH1 0 (offset); PUSH1 0 (value); CREATE; STOP
	let code = hex::decode("600060006000f000").unwrap();
	let mut host = TestHost::default();
	host.responses.push_back(CallResponse {
		success: true,
		created_address: H160::from_low_u64_be(0xcc),
		..CallResponse::default()
	});

	let result = engine()
		.run(&params(&code, 100_000, Revision::CANCUN), &mut host)
		.unwrap();
	assert!(result.success);

	let request = &host.calls[0];
	assert_eq!(request.kind, CallKind::Create);
	assert_eq!(request.sender, recipient());
	// 9 gas of pushes and 32000 static leave 67991.
	let expected = 67_991 - 67_991 / 64;
	assert_eq!(request.gas, expected);
	assert_eq!(result.gas_left, 67_991 - expected);
}

#[test]
fn failed_create_exposes_revert_data() {
	// CREATE, then RETURNDATASIZE; PUSH1 0; MSTORE; PUSH1 32; PUSH1 0;
	// RETURN
	let code = hex::decode("600060006000f03d60005260206000f3").unwrap();
	let mut host = TestHost::default();
	host.responses.push_back(CallResponse {
		success: false,
		output: vec![1, 2, 3, 4, 5],
		..CallResponse::default()
	});

	let result = engine()
		.run(&params(&code, 100_000, Revision::CANCUN), &mut host)
		.unwrap();
	assert!(result.success);
	// RETURNDATASIZE saw the revert payload.
	assert_eq!(U256::from_big_endian(&result.output), U256::from(5));
}

#[test]
fn selfdestruct_sweeps_and_terminates() {
	// PUSH1 0xaa; SELFDESTRUCT
	let code = hex::decode("60aaff").unwrap();
	let mut host = TestHost::default();
	host.set_balance(recipient(), U256::from(1_000));

	let result = engine()
		.run(&params(&code, 50_000, Revision::LONDON), &mut host)
		.unwrap();
	assert!(result.success);
	assert!(result.output.is_empty());
	assert!(host.destructed.contains(&recipient()));
	assert_eq!(host.balance(H160::from_low_u64_be(0xaa)), U256::from(1_000));
	// 3 push, 5000 static, 2600 cold beneficiary, 25000 value to a fresh
	// account; no refund since London.
	assert_eq!(result.gas_left, 50_000 - 3 - 5_000 - 2_600 - 25_000);
	assert_eq!(result.gas_refund, 0);
}

#[test]
fn selfdestruct_refunds_before_london() {
	let code = hex::decode("60aaff").unwrap();
	let mut host = TestHost::default();

	let result = engine()
		.run(&params(&code, 50_000, Revision::BERLIN), &mut host)
		.unwrap();
	assert!(result.success);
	assert_eq!(result.gas_refund, 24_000);
}

#[test]
fn extcodesize_reads_through_the_host() {
	let code = hex::decode("60bb3b60005260206000f3").unwrap();
	let mut host = TestHost::default();
	host.set_code(H160::from_low_u64_be(0xbb), vec![1, 2, 3]);

	let result = engine()
		.run(&params(&code, 100_000, Revision::CANCUN), &mut host)
		.unwrap();
	assert!(result.success);
	assert_eq!(U256::from_big_endian(&result.output), U256::from(3));
}

#[test]
fn balance_is_cheaper_when_warm() {
	// PUSH1 0xbb; BALANCE; POP; PUSH1 0xbb; BALANCE; STOP
	let code = hex::decode("60bb315060bb3100").unwrap();
	let mut host = TestHost::default();

	let result = engine()
		.run(&params(&code, 100_000, Revision::CANCUN), &mut host)
		.unwrap();
	assert!(result.success);
	// 3 + 2600 cold, 2 for POP, then 3 + 100 warm.
	assert_eq!(result.gas_left, 100_000 - 3 - 2_600 - 2 - 3 - 100);
}

#[test]
fn gas_left_never_exceeds_the_budget() {
	for (code, revision) in [
		("600360020160005260206000f3", Revision::CANCUN),
		("60006000fd", Revision::LONDON),
		("5f00", Revision::SHANGHAI),
		("00", Revision::ISTANBUL),
	] {
		let (result, _) = run_code(code, 5_000, revision);
		assert!(result.gas_left <= 5_000, "code {code}");
	}
}

#[test]
fn step_state_round_trips_without_execution() {
	let code = hex::decode("600360020160005260206000f3").unwrap();
	let mut host = TestHost::default();
	let state = StepState {
		status: Status::Running,
		pc: 2,
		gas: 5_000,
		refund: 3,
		stack: vec![U256::from(3)],
		memory: vec![0xab; 64],
		last_call_return_data: vec![9, 9],
		output: Vec::new(),
	};

	let round_tripped = engine()
		.step_n(&params(&code, 5_000, Revision::CANCUN), &mut host, state.clone(), 0)
		.unwrap();
	assert_eq!(round_tripped, state);
}

#[test]
fn step_n_advances_and_can_finish_the_run() {
	let code = hex::decode("600360020160005260206000f3").unwrap();
	let p = params(&code, 100_000, Revision::CANCUN);
	let mut host = TestHost::default();
	let engine = engine();

	let state = StepState {
		gas: 100_000,
		..StepState::default()
	};

	let state = engine.step_n(&p, &mut host, state, 2).unwrap();
	assert_eq!(state.status, Status::Running);
	assert_eq!(state.pc, 4);
	assert_eq!(state.gas, 100_000 - 6);
	assert_eq!(state.stack, vec![U256::from(3), U256::from(2)]);

	let state = engine.step_n(&p, &mut host, state, 100).unwrap();
	assert_eq!(state.status, Status::Returned);
	assert_eq!(U256::from_big_endian(&state.output), U256::from(5));

	// Terminal states pass through untouched.
	let terminal = engine.step_n(&p, &mut host, state.clone(), 10).unwrap();
	assert_eq!(terminal, state);
}

#[test]
fn step_n_rejects_unsupported_revisions() {
	let newer = Revision(Revision::NEWEST_SUPPORTED.0 + 1);
	let code = [0u8; 1];
	let mut host = TestHost::default();
	let result = engine().step_n(
		&params(&code, 1_000, newer),
		&mut host,
		StepState::default(),
		1,
	);
	assert_eq!(result.err(), Some(Error::UnsupportedRevision(newer)));
}
