pub(crate) mod origin_address;
