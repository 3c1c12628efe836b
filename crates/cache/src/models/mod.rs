mod mapping;

pub use self::mapping::Mapping;
pub(crate) use self::mapping::MappingRow;
