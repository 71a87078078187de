//! Snapshot persistence for user-authored handlers using `MessagePack`.
//!
//! Ordinary reloads already preserve user-authored verbs and functions in
//! memory; snapshots carry them across process restarts. Only
//! user-provenance records are captured, since everything system-authored
//! is reproducible from the source tree.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use thistle_engine::{Catalog, NewFunction, NewVerb, Owner, Provenance};
use thistle_foundation::{Error, ErrorKind, Result, Type};

/// One verb as stored in a snapshot.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct SavedVerb {
    /// The object or class the verb was attached to.
    pub owner: Owner,
    /// Primary name.
    pub name: String,
    /// Alternate names.
    pub aliases: Vec<String>,
    /// Optional argument pattern.
    pub pattern: Option<String>,
    /// Script body text.
    pub body: String,
}

/// One function as stored in a snapshot.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct SavedFunction {
    /// The object or class the function was attached to.
    pub owner: Owner,
    /// Function name.
    pub name: String,
    /// Ordered (parameter name, declared type) pairs.
    pub params: Vec<(String, Type)>,
    /// Declared return type.
    pub returns: Type,
    /// Script body text.
    pub body: String,
}

/// The user-authored portion of a catalog, detached from record ids.
///
/// Owner ids are only meaningful against a world rebuilt from the same
/// source tree; a snapshot restored into a differently-seeded world may
/// attach handlers to the wrong objects.
#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct Snapshot {
    /// Saved verbs.
    pub verbs: Vec<SavedVerb>,
    /// Saved functions.
    pub functions: Vec<SavedFunction>,
}

impl Snapshot {
    /// Captures every user-authored handler in the catalog.
    #[must_use]
    pub fn capture(catalog: &Catalog) -> Self {
        let mut verbs: Vec<SavedVerb> = catalog
            .verbs()
            .filter(|v| v.provenance == Provenance::User)
            .map(|v| SavedVerb {
                owner: v.owner,
                name: v.name.clone(),
                aliases: v.aliases.clone(),
                pattern: v.pattern.clone(),
                body: v.body.clone(),
            })
            .collect();
        verbs.sort_by(|a, b| a.name.cmp(&b.name));
        let mut functions: Vec<SavedFunction> = catalog
            .functions()
            .filter(|f| f.provenance == Provenance::User)
            .map(|f| SavedFunction {
                owner: f.owner,
                name: f.name.clone(),
                params: f.params.clone(),
                returns: f.returns.clone(),
                body: f.body.clone(),
            })
            .collect();
        functions.sort_by(|a, b| a.name.cmp(&b.name));
        Self { verbs, functions }
    }

    /// Returns true if the snapshot holds no handlers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.verbs.is_empty() && self.functions.is_empty()
    }

    /// Re-inserts the snapshot's handlers as user-authored records.
    ///
    /// A handler whose owner already carries one with the same name is
    /// skipped rather than overwritten. Returns the number restored.
    ///
    /// # Errors
    ///
    /// Returns an error if a saved verb carries a pattern that no longer
    /// compiles.
    pub fn restore(&self, catalog: &mut Catalog) -> Result<usize> {
        let mut restored = 0;
        for saved in &self.verbs {
            if catalog.has_verb(saved.owner, &saved.name) {
                continue;
            }
            let mut new = NewVerb::user(saved.owner, saved.name.clone(), saved.body.clone());
            new.aliases = saved.aliases.clone();
            new.pattern = saved.pattern.clone();
            catalog.add_verb(new)?;
            restored += 1;
        }
        for saved in &self.functions {
            if catalog.has_function(saved.owner, &saved.name) {
                continue;
            }
            catalog.add_function(NewFunction {
                owner: saved.owner,
                name: saved.name.clone(),
                params: saved.params.clone(),
                returns: saved.returns.clone(),
                body: saved.body.clone(),
                provenance: Provenance::User,
            });
            restored += 1;
        }
        Ok(restored)
    }
}

/// Serializes a snapshot to bytes using `MessagePack` format.
///
/// Uses named serialization to preserve struct field names.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn to_bytes(snapshot: &Snapshot) -> Result<Vec<u8>> {
    rmp_serde::to_vec_named(snapshot).map_err(|e| Error::new(ErrorKind::Internal(e.to_string())))
}

/// Deserializes a snapshot from `MessagePack` bytes.
///
/// # Errors
///
/// Returns an error if deserialization fails.
pub fn from_bytes(bytes: &[u8]) -> Result<Snapshot> {
    rmp_serde::from_slice(bytes).map_err(|e| Error::new(ErrorKind::Internal(e.to_string())))
}

/// Saves a snapshot to a file, creating or overwriting it.
///
/// # Errors
///
/// Returns an error if the file cannot be written or serialization fails.
pub fn save_to_file<P: AsRef<Path>>(snapshot: &Snapshot, path: P) -> Result<()> {
    let file = File::create(path.as_ref())?;
    let mut writer = BufWriter::new(file);
    let bytes = to_bytes(snapshot)?;
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}

/// Loads a snapshot from a `MessagePack` file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or deserialization fails.
pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Snapshot> {
    let file = File::open(path.as_ref())?;
    let mut reader = BufReader::new(file);
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    from_bytes(&bytes)
}
