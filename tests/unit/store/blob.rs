use std::cell::Cell;
use std::rc::Rc;

use super::*;

fn blob(tag: u8) -> StoredBlob {
    StoredBlob {
        mime: "image/png".to_string(),
        bytes: vec![tag; 16],
    }
}

/// Backend that fails every call while `broken` is set.
struct Broken {
    broken: Rc<Cell<bool>>,
    inner: HashMap<String, StoredBlob>,
}

impl BlobBackend for Broken {
    fn put(&mut self, key: &str, blob: &StoredBlob) -> ThenNowResult<()> {
        if self.broken.get() {
            return Err(ThenNowError::storage("put failed"));
        }
        self.inner.insert(key.into(), blob.clone());
        Ok(())
    }

    fn get(&self, key: &str) -> ThenNowResult<Option<StoredBlob>> {
        if self.broken.get() {
            return Err(ThenNowError::storage("get failed"));
        }
        Ok(self.inner.get(key).cloned())
    }

    fn delete(&mut self, key: &str) -> ThenNowResult<()> {
        self.inner.remove(key);
        Ok(())
    }
}

#[test]
fn sqlite_round_trip_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(BLOB_DB_FILE);
    {
        let mut store = BlobStore::sqlite(&path);
        assert_eq!(store.save("before", blob(1)), WriteOutcome::Persisted);
        assert_eq!(store.save("before", blob(2)), WriteOutcome::Persisted);
    }
    let mut store = BlobStore::sqlite(&path);
    assert_eq!(store.load("before").unwrap(), Some(blob(2)));
    assert_eq!(store.load("after").unwrap(), None);
    store.delete("before");
    assert_eq!(store.load("before").unwrap(), None);
}

#[test]
fn backend_is_opened_lazily_and_once() {
    let opens = Rc::new(Cell::new(0));
    let counter = Rc::clone(&opens);
    let mut store = BlobStore::lazy(move || {
        counter.set(counter.get() + 1);
        Err(ThenNowError::storage("no database"))
    });
    assert_eq!(opens.get(), 0);
    assert_eq!(store.save("after", blob(3)), WriteOutcome::SessionOnly);
    assert_eq!(store.load("after").unwrap(), Some(blob(3)));
    assert!(!store.is_persistent());
    assert_eq!(opens.get(), 1);
}

#[test]
fn read_error_is_surfaced_unless_memory_has_content() {
    let broken = Rc::new(Cell::new(false));
    let mut store = BlobStore::with_backend(Broken {
        broken: Rc::clone(&broken),
        inner: HashMap::new(),
    });
    broken.set(true);
    assert!(store.load("before").is_err());

    assert_eq!(store.save("before", blob(4)), WriteOutcome::SessionOnly);
    assert_eq!(store.load("before").unwrap(), Some(blob(4)));

    broken.set(false);
    assert_eq!(store.save("before", blob(5)), WriteOutcome::Persisted);
    assert_eq!(store.load("before").unwrap(), Some(blob(5)));
}
