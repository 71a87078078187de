//! The in-memory object and class store.

use std::collections::HashMap;
use std::collections::HashSet;

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use thistle_foundation::{ClassId, Error, ObjectId, Result, Value};

use crate::class::ObjectClass;
use crate::object::ObjectInstance;

/// The in-memory object and class store.
///
/// Holds the class hierarchy, all live object instances, and a seeded RNG
/// so scripted randomness is reproducible for a given seed. Concurrent
/// sessions share a `World` behind a mutex; individual property mutations
/// are not batched atomically, so concurrent handlers touching the same
/// object can interleave between lock acquisitions.
pub struct World {
    seed: u64,
    rng: ChaCha8Rng,
    classes: HashMap<ClassId, ObjectClass>,
    classes_by_name: HashMap<String, ClassId>,
    objects: HashMap<ObjectId, ObjectInstance>,
    next_class: u64,
    next_object: u64,
}

impl World {
    /// Creates a new world with the given RNG seed.
    ///
    /// The world starts with a builtin `system` class and the singleton
    /// system object [`ObjectId::SYSTEM`] instantiating it.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        let mut world = Self {
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
            classes: HashMap::new(),
            classes_by_name: HashMap::new(),
            objects: HashMap::new(),
            next_class: 1,
            next_object: 1,
        };
        let system_class = world.register_class("system", None);
        let mut system = ObjectInstance::new(ObjectId::SYSTEM, system_class);
        system.set_property("name", Value::from("system"));
        world.objects.insert(ObjectId::SYSTEM, system);
        world
    }

    /// Returns the seed this world was created with.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Returns the number of live objects, including the system object.
    #[must_use]
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    // --- Classes ---

    /// Registers a class, returning the existing id if the name is taken.
    ///
    /// Class names are unique case-insensitively.
    pub fn register_class(&mut self, name: &str, parent: Option<ClassId>) -> ClassId {
        let key = name.to_lowercase();
        if let Some(&existing) = self.classes_by_name.get(&key) {
            return existing;
        }
        let id = ClassId::new(self.next_class);
        self.next_class += 1;
        self.classes.insert(id, ObjectClass::new(id, name, parent));
        self.classes_by_name.insert(key, id);
        id
    }

    /// Gets a class record by id.
    #[must_use]
    pub fn class(&self, id: ClassId) -> Option<&ObjectClass> {
        self.classes.get(&id)
    }

    /// Finds a class by name, case-insensitively.
    #[must_use]
    pub fn find_class(&self, name: &str) -> Option<ClassId> {
        self.classes_by_name.get(&name.to_lowercase()).copied()
    }

    /// Resolves a class's parent link.
    #[must_use]
    pub fn parent_of(&self, id: ClassId) -> Option<ClassId> {
        self.classes.get(&id).and_then(|c| c.parent)
    }

    /// Returns the inheritance chain for a class, ordered root-first.
    ///
    /// The walk terminates when a parent link is missing, returning the
    /// truncated chain rather than failing. A revisited id also stops the
    /// walk, so a cyclic graph cannot hang the resolver.
    #[must_use]
    pub fn inheritance_chain(&self, id: ClassId) -> Vec<ClassId> {
        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        let mut current = Some(id);
        while let Some(class_id) = current {
            if !seen.insert(class_id) {
                break;
            }
            if !self.classes.contains_key(&class_id) {
                break;
            }
            chain.push(class_id);
            current = self.parent_of(class_id);
        }
        chain.reverse();
        chain
    }

    // --- Objects ---

    /// Instantiates a new object of the given class.
    pub fn spawn(&mut self, class: ClassId) -> Result<ObjectId> {
        if !self.classes.contains_key(&class) {
            return Err(Error::class_not_found(class));
        }
        let id = ObjectId::new(self.next_object);
        self.next_object += 1;
        self.objects.insert(id, ObjectInstance::new(id, class));
        Ok(id)
    }

    /// Returns true if the object exists.
    #[must_use]
    pub fn exists(&self, id: ObjectId) -> bool {
        self.objects.contains_key(&id)
    }

    /// Gets an object record by id.
    #[must_use]
    pub fn object(&self, id: ObjectId) -> Option<&ObjectInstance> {
        self.objects.get(&id)
    }

    /// Gets a mutable object record by id.
    pub fn object_mut(&mut self, id: ObjectId) -> Option<&mut ObjectInstance> {
        self.objects.get_mut(&id)
    }

    /// Iterates over all live object ids.
    pub fn objects(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.objects.keys().copied()
    }

    /// Gets a named property on an object, or nil if the property is absent.
    pub fn get_property(&self, id: ObjectId, name: &str) -> Result<Value> {
        self.objects
            .get(&id)
            .map(|obj| obj.property(name))
            .ok_or_else(|| Error::object_not_found(id))
    }

    /// Sets a named property on an object.
    pub fn set_property(&mut self, id: ObjectId, name: &str, value: Value) -> Result<()> {
        let obj = self
            .objects
            .get_mut(&id)
            .ok_or_else(|| Error::object_not_found(id))?;
        obj.set_property(name, value);
        Ok(())
    }

    /// Returns the location of an object, if it has one.
    #[must_use]
    pub fn location_of(&self, id: ObjectId) -> Option<ObjectId> {
        self.objects.get(&id).and_then(|obj| obj.location)
    }

    /// Lists the objects at a location.
    #[must_use]
    pub fn contents_of(&self, id: ObjectId) -> Vec<ObjectId> {
        self.objects
            .get(&id)
            .map(|obj| obj.contents.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Moves an object to a new location, updating both content lists.
    pub fn move_object(&mut self, id: ObjectId, dest: ObjectId) -> Result<()> {
        if !self.objects.contains_key(&id) {
            return Err(Error::object_not_found(id));
        }
        if !self.objects.contains_key(&dest) {
            return Err(Error::object_not_found(dest));
        }
        let old = self.objects.get(&id).and_then(|obj| obj.location);
        if let Some(old_loc) = old {
            if let Some(container) = self.objects.get_mut(&old_loc) {
                container.contents.retain(|&c| c != id);
            }
        }
        if let Some(container) = self.objects.get_mut(&dest) {
            container.contents.push_back(id);
        }
        if let Some(obj) = self.objects.get_mut(&id) {
            obj.location = Some(dest);
        }
        Ok(())
    }

    /// Returns an object's display name.
    #[must_use]
    pub fn name_of(&self, id: ObjectId) -> String {
        self.objects
            .get(&id)
            .map_or_else(|| id.to_string(), ObjectInstance::display_name)
    }

    /// Finds an object by display name, case-insensitively.
    ///
    /// When `near` is given, objects at that location (and the location
    /// itself) are preferred before a world-wide scan.
    #[must_use]
    pub fn find_by_name(&self, name: &str, near: Option<ObjectId>) -> Option<ObjectId> {
        let wanted = name.to_lowercase();
        let matches = |id: ObjectId| self.name_of(id).to_lowercase() == wanted;
        if let Some(location) = near {
            if let Some(found) = self.contents_of(location).into_iter().find(|&c| matches(c)) {
                return Some(found);
            }
            if matches(location) {
                return Some(location);
            }
        }
        let mut ids: Vec<ObjectId> = self.objects.keys().copied().collect();
        ids.sort_unstable();
        ids.into_iter().find(|&id| matches(id))
    }

    /// Finds the first object satisfying a predicate, in id order.
    #[must_use]
    pub fn find_object<F>(&self, predicate: F) -> Option<ObjectId>
    where
        F: Fn(&ObjectInstance) -> bool,
    {
        let mut ids: Vec<ObjectId> = self.objects.keys().copied().collect();
        ids.sort_unstable();
        ids.into_iter()
            .find(|id| self.objects.get(id).is_some_and(&predicate))
    }

    /// Finds the first object of the given class (or a subclass of it).
    #[must_use]
    pub fn find_instance_of(&self, class: ClassId) -> Option<ObjectId> {
        self.find_object(|obj| self.inheritance_chain(obj.class).contains(&class))
    }

    // --- Randomness ---

    /// Returns a random integer in `[low, high]` from the seeded RNG.
    pub fn random_range(&mut self, low: i64, high: i64) -> i64 {
        if low >= high {
            return low;
        }
        self.rng.gen_range(low..=high)
    }
}

impl std::fmt::Debug for World {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("World")
            .field("seed", &self.seed)
            .field("classes", &self.classes.len())
            .field("objects", &self.objects.len())
            .finish_non_exhaustive()
    }
}
