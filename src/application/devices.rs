//! Audio device listing use case

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use tracing::error;

use super::ports::DeviceLister;

/// Marker preceding each source in the listing
const NAME_MARKER: &str = "name:";

/// Extract device ids from a `name: <device-id>` listing, in order.
/// Entries without an angle-bracketed id are skipped.
pub fn parse_device_listing(listing: &str) -> Vec<String> {
    listing
        .split(NAME_MARKER)
        .skip(1)
        .filter_map(|entry| {
            let start = entry.find('<')? + 1;
            let len = entry[start..].find('>')?;
            let name = &entry[start..start + len];
            (!name.is_empty()).then(|| name.to_string())
        })
        .collect()
}

/// Audio capture sources in discovery order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioDevices {
    /// Plain list of device ids
    Ordered(Vec<String>),
    /// `dev0`, `dev1`, ... keyed ids
    Indexed(Vec<(String, String)>),
}

impl AudioDevices {
    pub fn from_names(names: Vec<String>, as_array: bool) -> Self {
        if as_array {
            return Self::Ordered(names);
        }
        Self::Indexed(
            names
                .into_iter()
                .enumerate()
                .map(|(i, name)| (format!("dev{}", i), name))
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Ordered(names) => names.len(),
            Self::Indexed(entries) => entries.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Device ids, keys dropped
    pub fn names(&self) -> Vec<&str> {
        match self {
            Self::Ordered(names) => names.iter().map(String::as_str).collect(),
            Self::Indexed(entries) => entries.iter().map(|(_, name)| name.as_str()).collect(),
        }
    }

    /// Look up an id by its `devN` key
    pub fn get(&self, key: &str) -> Option<&str> {
        match self {
            Self::Ordered(_) => None,
            Self::Indexed(entries) => entries
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, name)| name.as_str()),
        }
    }
}

impl Serialize for AudioDevices {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Ordered(names) => {
                let mut seq = serializer.serialize_seq(Some(names.len()))?;
                for name in names {
                    seq.serialize_element(name)?;
                }
                seq.end()
            }
            Self::Indexed(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, name) in entries {
                    map.serialize_entry(key, name)?;
                }
                map.end()
            }
        }
    }
}

/// List audio capture sources through a [`DeviceLister`].
///
/// A failed query is logged and yields an empty collection.
pub fn list_audio_devices<L: DeviceLister + ?Sized>(lister: &L, as_array: bool) -> AudioDevices {
    let names = match lister.list_sources() {
        Ok(listing) => parse_device_listing(&listing),
        Err(e) => {
            error!("Could not obtain audio devices list: {}", e);
            Vec::new()
        }
    };
    AudioDevices::from_names(names, as_array)
}
