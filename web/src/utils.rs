use gloo::storage::{LocalStorage, Storage};
use serde::{Serialize, de::DeserializeOwned};

/// Key used to keep a value in the browser's local storage.
pub(crate) trait StorageKey {
    const KEY: &'static str;
}

pub(crate) trait LocalStore: StorageKey + Serialize + DeserializeOwned + Sized {
    fn local_load() -> Option<Self> {
        match LocalStorage::get(Self::KEY) {
            Ok(value) => Some(value),
            Err(err) => {
                log::debug!("nothing usable stored under {}: {:?}", Self::KEY, err);
                None
            }
        }
    }

    fn local_or_default() -> Self
    where
        Self: Default,
    {
        Self::local_load().unwrap_or_default()
    }

    fn local_save(&self) {
        if let Err(err) = LocalStorage::set(Self::KEY, self) {
            log::error!("could not save {} to local storage: {:?}", Self::KEY, err);
        }
    }

    fn local_clear() {
        LocalStorage::delete(Self::KEY);
    }
}

impl<T: StorageKey + Serialize + DeserializeOwned> LocalStore for T {}

/// Helper function to use JavaScript's Math.random
pub(crate) fn js_random_seed() -> u64 {
    use js_sys::Math::random;
    u64::from_be_bytes([
        (256. * random()) as u8,
        (256. * random()) as u8,
        (256. * random()) as u8,
        (256. * random()) as u8,
        (256. * random()) as u8,
        (256. * random()) as u8,
        (256. * random()) as u8,
        (256. * random()) as u8,
    ])
}
