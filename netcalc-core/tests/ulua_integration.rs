//! Integration tests for unique local address generation

use netcalc_core::address::{self, Address};
use netcalc_core::mac::MacAddr;
use netcalc_core::subnet::{Subnet, SubnetInfo};
use netcalc_core::ulua::{self, GlobalId, InterfaceId, NtpTimestamp, SubnetId, Ulua};
use std::time::{Duration, UNIX_EPOCH};

#[test]
fn test_mac_to_text_pipeline() {
    let mac: MacAddr = "00:1b:63:84:45:e6".parse().unwrap();
    let timestamp = NtpTimestamp::new(3_900_000_000, 0x8000_0000);

    let address = ulua::build_ulua(&mac, timestamp, SubnetId::default()).unwrap();
    assert_eq!(address.to_string(), "fd9e:2c6b:9f1c:0:21b:63ff:fe84:45e6");

    // The text form parses back to the same bytes
    assert_eq!(address::parse(&address.to_string()).unwrap(), address);
}

#[test]
fn test_generated_addresses_are_unique_local() {
    let ula_range = Subnet::from_cidr("fd00::/8").unwrap();
    let mac = MacAddr::new([0xac, 0xde, 0x48, 0x00, 0x11, 0x22]);

    for secs in (0..3600).step_by(97) {
        let timestamp = NtpTimestamp::from(UNIX_EPOCH + Duration::from_secs(1_700_000_000 + secs));
        let ulua = Ulua::from_hardware_address(&mac, timestamp).unwrap();

        assert!(ula_range.is_in_range(&ulua.address()));
        assert_eq!(ulua.to_bytes().len(), 16);
        assert_eq!(ulua.global_id().as_bytes()[0], 0xfd);
    }
}

#[test]
fn test_same_inputs_same_address() {
    let mac = MacAddr::new([0x00, 0x1b, 0x63, 0x84, 0x45, 0xe6]);
    let timestamp = NtpTimestamp::from_bits(0x0123_4567_89ab_cdef);

    let a = Ulua::from_hardware_address(&mac, timestamp).unwrap();
    let b = Ulua::from_hardware_address(&mac, timestamp).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.to_string(), b.to_string());
}

#[test]
fn test_subnet_ids_share_site_prefix() {
    let mac = MacAddr::new([0x00, 0x1b, 0x63, 0x84, 0x45, 0xe6]);
    let base = Ulua::from_hardware_address(&mac, NtpTimestamp::new(1, 2)).unwrap();
    let site = base.site_prefix().unwrap();

    for id in [0u16, 1, 0x2a, 0xffff] {
        let ulua = base.with_subnet_id(SubnetId::from(id));
        assert!(site.is_in_range(&ulua.address()));
        assert_eq!(ulua.global_id(), base.global_id());
        assert_eq!(ulua.subnet_id().value(), id);
    }
}

#[test]
fn test_assemble_from_supplied_parts() {
    let global_id = GlobalId::try_from(&[0xfd, 0x12, 0x34, 0x56, 0x78, 0x9a][..]).unwrap();
    let subnet_id = SubnetId::try_from(&[0x00, 0x01][..]).unwrap();
    let interface_id = InterfaceId::try_from(&[0, 0, 0, 0, 0, 0, 0, 1][..]).unwrap();

    let ulua = Ulua::from_parts(global_id, subnet_id, interface_id);
    assert_eq!(ulua.to_string(), "fd12:3456:789a:1::1");
    assert_eq!(ulua.address(), "fd12:3456:789a:1::1".parse::<Address>().unwrap());
}

#[test]
fn test_supplied_parts_are_validated() {
    assert!(GlobalId::try_from(&[0xfc, 0, 0, 0, 0, 0][..]).is_err());
    assert!(GlobalId::try_from(&[0xfd, 0, 0, 0, 0, 0, 0][..]).is_err());
    assert!(SubnetId::try_from(&[0u8; 3][..]).is_err());
    assert!(InterfaceId::try_from(&[0u8; 6][..]).is_err());
}

#[test]
fn test_random_identifier_fallback() {
    let system_id = [0x9f, 0x00, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66];
    let ulua = Ulua::from_system_id(system_id, NtpTimestamp::new(3_900_000_000, 0)).unwrap();

    assert_eq!(ulua.interface_id().as_bytes(), &system_id);
    assert_eq!(ulua.global_id().as_bytes()[0], 0xfd);
    assert!(ulua.to_string().ends_with(":9f00:1122:3344:5566"));
}
