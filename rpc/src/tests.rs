use super::*;
use crate::error::error_codes;
use anon_paymaster::mock::{IndexedPool, MockGateway};
use anon_paymaster_primitives::{
	PaymasterContext, PaymasterPayload, PoolId, SpendingMode, PAYMASTER_DATA_LEN,
};
use serde_json::json;
use test_utils::{test_key_store, PoolFixture, TEST_DEPTH};

const POOL: u64 = 11;

fn fixture() -> PoolFixture {
	PoolFixture::new(POOL, TEST_DEPTH).with_members(3)
}

fn context(pool: u64) -> Bytes {
	let context =
		PaymasterContext::new(PoolId::from(pool), SpendingMode::SingleUseVoucher).unwrap();
	Bytes(context.encode())
}

fn user_op() -> UserOperation {
	UserOperation {
		sender: Address::new([0x11; 20]),
		nonce: "0x1".into(),
		call_data: vec![0xde, 0xad, 0xbe, 0xef],
	}
}

fn entry_point() -> Address {
	Address::new([0x55; 20])
}

fn rpc(fixture: &PoolFixture, identity: Option<Identity>) -> PaymasterRpc<Arc<MockGateway>> {
	let pool = IndexedPool {
		metadata: fixture.metadata(),
		root_history: fixture.root_history(),
		members: fixture.members(),
	};
	let gateway = Arc::new(MockGateway::new().with_pool(pool));
	let config = EngineConfig::default();
	let prover = Arc::new(MembershipProver::new(test_key_store(&[TEST_DEPTH])));
	PaymasterRpc::new(
		PaymasterDataAssembler::new(gateway, prover, &config),
		GasOverheadEstimator::new(config.gas),
		identity,
		config.post_op_gas_limit,
	)
}

#[test]
fn methods_are_registered_under_pm_namespace() {
	let module = rpc(&fixture(), None).into_rpc();
	let names: Vec<_> = module.method_names().collect();

	assert!(names.contains(&"pm_getPaymasterStubData"));
	assert!(names.contains(&"pm_getPaymasterData"));
	assert!(names.contains(&"pm_estimateGasOverhead"));
}

#[tokio::test]
async fn stub_data_carries_gas_limits() {
	let fixture = fixture();
	let response = rpc(&fixture, None)
		.get_paymaster_stub_data(user_op(), entry_point(), "0x1".into(), context(POOL))
		.await
		.unwrap();

	assert_eq!(response.paymaster, fixture.metadata().paymaster);
	assert_eq!(response.paymaster_data.len(), PAYMASTER_DATA_LEN);
	assert_eq!(response.paymaster_verification_gas_limit, "0x46500");
	assert_eq!(response.paymaster_post_op_gas_limit, "0xfde8");
	assert!(!response.is_final);
}

#[tokio::test]
async fn final_data_proves_membership() {
	let fixture = fixture();
	let rpc = rpc(&fixture, Some(fixture.identity(1)));

	let stub = rpc
		.get_paymaster_stub_data(user_op(), entry_point(), "0x1".into(), context(POOL))
		.await
		.unwrap();
	let response = rpc
		.get_paymaster_data(user_op(), entry_point(), "0x1".into(), context(POOL))
		.await
		.unwrap();

	assert_eq!(response.paymaster, stub.paymaster);
	assert_eq!(response.paymaster_data.len(), stub.paymaster_data.len());

	let payload = PaymasterPayload::decode(&response.paymaster_data).unwrap();
	let expected = fixture.identity(1).nullifier(&PoolId::from(POOL).scope());
	assert_eq!(payload.nullifier, expected);
	assert_eq!(payload.pool_id, PoolId::from(POOL));
}

#[tokio::test]
async fn final_data_needs_an_identity() {
	let err = rpc(&fixture(), None)
		.get_paymaster_data(user_op(), entry_point(), "0x1".into(), context(POOL))
		.await
		.unwrap_err();

	assert_eq!(err.code(), error_codes::PROOF_GENERATION_FAILURE);
}

#[tokio::test]
async fn unknown_pool_is_reported() {
	let err = rpc(&fixture(), None)
		.get_paymaster_stub_data(user_op(), entry_point(), "0x1".into(), context(POOL + 1))
		.await
		.unwrap_err();

	assert_eq!(err.code(), error_codes::POOL_NOT_FOUND);
}

#[tokio::test]
async fn malformed_params_are_rejected() {
	let rpc = rpc(&fixture(), None);

	let err = rpc
		.get_paymaster_stub_data(user_op(), entry_point(), "0x1".into(), Bytes(vec![1, 2, 3]))
		.await
		.unwrap_err();
	assert_eq!(err.code(), error_codes::INVALID_PARAMS);

	let err = rpc
		.get_paymaster_stub_data(user_op(), entry_point(), "mainnet".into(), context(POOL))
		.await
		.unwrap_err();
	assert_eq!(err.code(), error_codes::INVALID_PARAMS);
}

#[tokio::test]
async fn non_member_cannot_get_final_data() {
	let fixture = fixture();
	let outsider = Identity::from_phrase("not in the pool").unwrap();
	let err = rpc(&fixture, Some(outsider))
		.get_paymaster_data(user_op(), entry_point(), "0x1".into(), context(POOL))
		.await
		.unwrap_err();

	assert_eq!(err.code(), error_codes::PROOF_GENERATION_FAILURE);
}

#[tokio::test]
async fn gas_overhead_over_the_wire() {
	let module = rpc(&fixture(), None).into_rpc();

	let overhead: String = module.call("pm_estimateGasOverhead", [20u8]).await.unwrap();
	assert_eq!(overhead, "0x4e200");
	assert!(module.call::<_, String>("pm_estimateGasOverhead", [0u8]).await.is_err());
	assert!(module.call::<_, String>("pm_estimateGasOverhead", [33u8]).await.is_err());
}

#[tokio::test]
async fn stub_data_over_the_wire() {
	let fixture = fixture();
	let module = rpc(&fixture, None).into_rpc();
	let params = [
		json!({
			"sender": "0x1111111111111111111111111111111111111111",
			"nonce": "0x1",
			"callData": "0xdeadbeef",
			"callGasLimit": "0x5208"
		}),
		json!("0x5555555555555555555555555555555555555555"),
		json!("0xaa36a7"),
		serde_json::to_value(context(POOL)).unwrap(),
	];

	let response: StubDataResponse =
		module.call("pm_getPaymasterStubData", params.clone()).await.unwrap();
	assert_eq!(response.paymaster, fixture.metadata().paymaster);
	assert_eq!(response.paymaster_data.len(), PAYMASTER_DATA_LEN);
	assert!(!response.is_final);

	let mut other_pool = params;
	other_pool[3] = serde_json::to_value(context(POOL + 1)).unwrap();
	assert!(module
		.call::<_, StubDataResponse>("pm_getPaymasterStubData", other_pool)
		.await
		.is_err());
}

#[test]
fn config_reads_nested_engine_section() {
	let config = RpcConfig::from_json(
		r#"{
			"listenAddr": "0.0.0.0:4337",
			"identitySecret": "0x2a",
			"engine": { "indexUrl": "http://index:8000/graphql", "cacheCapacity": 0 }
		}"#,
	)
	.unwrap();

	assert_eq!(config.listen_addr.port(), 4337);
	assert_eq!(config.engine.index_url, "http://index:8000/graphql");
	assert_eq!(config.engine.cache_capacity, 0);
	assert_eq!(config.engine.index_timeout_ms, EngineConfig::default().index_timeout_ms);
	assert!(config.identity().unwrap().is_some());
}

#[test]
fn zero_identity_secret_is_rejected() {
	let config = RpcConfig { identity_secret: Some("0x0".into()), ..Default::default() };
	assert!(matches!(config.identity(), Err(ServiceError::Identity(_))));
}
