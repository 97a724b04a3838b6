use std::fmt;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum StorageLocation {
    #[default]
    Local,
    Cloud,
}

impl StorageLocation {
    pub fn to_raw(self) -> u32 {
        match self {
            StorageLocation::Local => 1,
            StorageLocation::Cloud => 2,
        }
    }

    pub fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            1 => Some(StorageLocation::Local),
            2 => Some(StorageLocation::Cloud),
            _ => None,
        }
    }
}

impl fmt::Display for StorageLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageLocation::Local => f.write_str("local"),
            StorageLocation::Cloud => f.write_str("cloud"),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PersistenceMode {
    #[default]
    Indefinite,
}

impl PersistenceMode {
    pub fn to_raw(self) -> u32 {
        match self {
            PersistenceMode::Indefinite => 1,
        }
    }
}
