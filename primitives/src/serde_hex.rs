//! Custom serde serialization helpers

/// Serialization shim for fixed-size byte arrays as `0x`-prefixed hex strings.
///
/// Wallets and bundlers send us `"0x01020304"`, but the default rust implementation for arrays
/// expects `[1, 2, 3, 4]`. We serialize like `impl-serde` does for `Vec<u8>` and transform the
/// result into an array, checking the length.
pub mod serialize_array {
	use impl_serde::serialize::{deserialize_check_len, ExpectedLen};
	use serde::Deserializer;

	// default serialize is fine
	pub use impl_serde::serialize::serialize;

	pub use deserialize_array as deserialize;

	pub fn deserialize_array<'de, D, const T: usize>(deserializer: D) -> Result<[u8; T], D::Error>
	where
		D: Deserializer<'de>,
	{
		let mut arr = [0u8; T];
		deserialize_check_len(deserializer, ExpectedLen::Exact(&mut arr[..]))?;

		Ok(arr)
	}
}

/// `0x` hex for variable-length byte strings (call data, paymaster data, context blobs).
pub mod serialize_bytes {
	pub use impl_serde::serialize::{deserialize, serialize};
}

#[cfg(test)]
mod tests {
	use super::serialize_array;

	fn deserialize<const T: usize>(arr: &str) -> Result<[u8; T], serde_json::Error> {
		let mut der = serde_json::Deserializer::new(serde_json::de::StrRead::new(arr));
		serialize_array::deserialize(&mut der)
	}

	fn serialize<const T: usize>(arr: [u8; T]) -> String {
		let mut v = vec![];

		let mut ser = serde_json::Serializer::new(std::io::Cursor::new(&mut v));
		serialize_array::serialize(&arr, &mut ser).unwrap();

		String::from_utf8(v).unwrap()
	}

	#[test]
	fn deserialize_works() {
		assert_eq!(deserialize("\"0x0000\"").unwrap(), [0x00, 0x00]);
		assert_eq!(deserialize("\"0x0100\"").unwrap(), [0x01, 0x00]);
		assert_eq!(deserialize("\"0x0010\"").unwrap(), [0x00, 0x10]);
	}

	#[test]
	fn deserialize_rejects_wrong_length() {
		assert!(deserialize::<3>("\"0x0000\"").is_err());
	}

	#[test]
	fn serialize_works() {
		assert_eq!(serialize([0x00, 0x00]), "\"0x0000\"".to_owned());
		assert_eq!(serialize([0x01, 0x00]), "\"0x0100\"".to_owned());
		assert_eq!(serialize([0x00, 0x10]), "\"0x0010\"".to_owned());
	}
}
