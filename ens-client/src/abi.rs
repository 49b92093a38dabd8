//! Contract bindings for the registry and resolver.
//!
//! Only the methods the client calls are declared. Resolvers vary in which
//! getters they implement; [`IResolver::supportsInterfaceCall`] tells them apart.

#![allow(missing_docs)]

use alloy::sol;

sol! {
    /// ENS registry contract.
    interface IRegistry {
        function owner(bytes32 node) external view returns (address);
        function resolver(bytes32 node) external view returns (address);
        function setOwner(bytes32 node, address owner) external;
        function setResolver(bytes32 node, address resolver) external;
        function setSubnodeOwner(bytes32 node, bytes32 label, address owner) external;
    }

    /// Public resolver contract.
    interface IResolver {
        function supportsInterface(bytes4 interfaceID) external view returns (bool);
        function has(bytes32 node, bytes32 kind) external view returns (bool);
        function addr(bytes32 node) external view returns (address);
        function name(bytes32 node) external view returns (string);
        function ABI(bytes32 node, uint256 contentTypes) external view returns (uint256, bytes);
        function setAddr(bytes32 node, address addr) external;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{Address, B256};
    use alloy::sol_types::SolCall;
    use ens_core::constants::{ABI_INTERFACE_ID, ADDR_INTERFACE_ID, INTERFACE_META_ID, NAME_INTERFACE_ID};

    #[test]
    fn test_selectors_match_interface_ids() {
        assert_eq!(IResolver::supportsInterfaceCall::SELECTOR, INTERFACE_META_ID);
        assert_eq!(IResolver::addrCall::SELECTOR, ADDR_INTERFACE_ID);
        assert_eq!(IResolver::nameCall::SELECTOR, NAME_INTERFACE_ID);
        assert_eq!(IResolver::ABICall::SELECTOR, ABI_INTERFACE_ID);
    }

    #[test]
    fn test_registry_call_encoding() {
        let node = B256::repeat_byte(0x42);
        let data = IRegistry::resolverCall { node }.abi_encode();

        assert_eq!(data.len(), 4 + 32);
        assert_eq!(&data[4..], node.as_slice());
    }

    #[test]
    fn test_return_decoding() {
        let owner = Address::repeat_byte(0x11);
        let encoded = IRegistry::ownerCall::abi_encode_returns(&(owner,));
        let decoded = IRegistry::ownerCall::abi_decode_returns(&encoded, true).unwrap();
        assert_eq!(decoded._0, owner);
    }
}
