//! Registry of randomizer tags attached to host objects.
//!
//! Tags are plain Rust values implementing [`RandomizerTag`]. Each tag type can name
//! a parent tag type through [`RandomizerTag::base`], which lets a query for a base
//! type also return every tag whose type descends from it. The registry keeps tags in
//! insertion order per type so randomizers process objects deterministically.
use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};

use hashlink::LinkedHashSet;
use tracing::debug;

/// Identifier of a host-side object that can carry tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub u64);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A marker value attached to exactly one object.
pub trait RandomizerTag: Any {
    /// Direct parent tag type. `None` means the type derives from the root tag.
    fn base() -> Option<TagType>
    where
        Self: Sized,
    {
        None
    }
}

/// Runtime descriptor of a tag type.
#[derive(Clone, Copy)]
pub struct TagType {
    id: TypeId,
    name: &'static str,
    parent: fn() -> Option<TagType>,
}

impl TagType {
    pub fn of<T: RandomizerTag>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
            parent: T::base,
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn parent(&self) -> Option<TagType> {
        (self.parent)()
    }

    /// Whether `self` is `ancestor` or one of its descendants.
    pub fn is_a(&self, ancestor: TagType) -> bool {
        let mut current = Some(*self);
        while let Some(t) = current {
            if t == ancestor {
                return true;
            }
            current = t.parent();
        }
        false
    }
}

impl PartialEq for TagType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TagType {}

impl Hash for TagType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TagType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TagType").field(&self.name).finish()
    }
}

/// A tag returned by a query.
#[derive(Clone, Copy)]
pub struct TagRef<'a> {
    pub object: ObjectId,
    pub tag_type: TagType,
    pub tag: &'a dyn Any,
}

impl<'a> TagRef<'a> {
    /// Borrows the tag as its concrete type.
    pub fn downcast<U: 'static>(&self) -> Option<&'a U> {
        self.tag.downcast_ref::<U>()
    }
}

impl fmt::Debug for TagRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TagRef")
            .field("object", &self.object)
            .field("tag_type", &self.tag_type)
            .finish_non_exhaustive()
    }
}

struct TypeEntry {
    tag_type: TagType,
    objects: LinkedHashSet<ObjectId>,
    values: HashMap<ObjectId, Box<dyn Any>>,
}

impl TypeEntry {
    fn new(tag_type: TagType) -> Self {
        Self {
            tag_type,
            objects: LinkedHashSet::new(),
            values: HashMap::new(),
        }
    }
}

/// Type-indexed tag registry with subclass queries.
///
/// One manager belongs to one scenario; it is passed explicitly to randomizers
/// through their context.
#[derive(Default)]
pub struct TagManager {
    types: HashMap<TypeId, TypeEntry>,
    children: HashMap<TypeId, LinkedHashSet<TypeId>>,
}

impl TagManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches `tag` to `object`.
    ///
    /// Re-adding a tag of the same type replaces its value but keeps the object's
    /// original position in query order.
    pub fn add_tag<T: RandomizerTag>(&mut self, object: ObjectId, tag: T) {
        let tag_type = TagType::of::<T>();
        self.register_type(tag_type);
        if let Some(entry) = self.types.get_mut(&tag_type.id) {
            // hashlink moves re-inserted values to the back.
            if !entry.objects.contains(&object) {
                entry.objects.insert(object);
            }
            entry.values.insert(object, Box::new(tag));
        }
    }

    /// Detaches the tag of type `T` from `object` and returns it. Absent tags are a no-op.
    pub fn remove_tag<T: RandomizerTag>(&mut self, object: ObjectId) -> Option<T> {
        let entry = self.types.get_mut(&TypeId::of::<T>())?;
        entry.objects.remove(&object);
        let boxed = entry.values.remove(&object)?;
        boxed.downcast::<T>().ok().map(|tag| *tag)
    }

    /// Detaches every tag of `object`. Returns how many were removed.
    pub fn remove_object(&mut self, object: ObjectId) -> usize {
        let mut removed = 0;
        for entry in self.types.values_mut() {
            if entry.objects.remove(&object) {
                entry.values.remove(&object);
                removed += 1;
            }
        }
        removed
    }

    /// Tags of type `T`, optionally including every descendant type.
    ///
    /// Descendants are visited depth first; tags within a type keep insertion order.
    pub fn query<T: RandomizerTag>(&self, include_subclasses: bool) -> Vec<TagRef<'_>> {
        let mut out = Vec::new();
        for type_id in self.visit_order(TypeId::of::<T>(), include_subclasses) {
            let Some(entry) = self.types.get(&type_id) else {
                continue;
            };
            for object in entry.objects.iter() {
                if let Some(value) = entry.values.get(object) {
                    out.push(TagRef {
                        object: *object,
                        tag_type: entry.tag_type,
                        tag: value.as_ref(),
                    });
                }
            }
        }
        out
    }

    /// Tags of exactly type `T`, in insertion order.
    pub fn query_exact<T: RandomizerTag>(&self) -> impl Iterator<Item = (ObjectId, &T)> + '_ {
        self.types
            .get(&TypeId::of::<T>())
            .into_iter()
            .flat_map(|entry| {
                entry.objects.iter().filter_map(move |object| {
                    let tag = entry.values.get(object)?.downcast_ref::<T>()?;
                    Some((*object, tag))
                })
            })
    }

    /// Objects carrying a tag of exactly type `T`, in insertion order.
    pub fn objects_with<T: RandomizerTag>(&self) -> Vec<ObjectId> {
        self.query_exact::<T>().map(|(object, _)| object).collect()
    }

    pub fn get<T: RandomizerTag>(&self, object: ObjectId) -> Option<&T> {
        self.types
            .get(&TypeId::of::<T>())?
            .values
            .get(&object)?
            .downcast_ref::<T>()
    }

    pub fn get_mut<T: RandomizerTag>(&mut self, object: ObjectId) -> Option<&mut T> {
        self.types
            .get_mut(&TypeId::of::<T>())?
            .values
            .get_mut(&object)?
            .downcast_mut::<T>()
    }

    pub fn contains<T: RandomizerTag>(&self, object: ObjectId) -> bool {
        self.types
            .get(&TypeId::of::<T>())
            .is_some_and(|entry| entry.objects.contains(&object))
    }

    /// Number of tags a [`query`](Self::query) with the same arguments would return.
    pub fn count<T: RandomizerTag>(&self, include_subclasses: bool) -> usize {
        self.visit_order(TypeId::of::<T>(), include_subclasses)
            .into_iter()
            .filter_map(|type_id| self.types.get(&type_id))
            .map(|entry| entry.objects.len())
            .sum()
    }

    /// Tag types seen so far.
    pub fn known_types(&self) -> impl Iterator<Item = TagType> + '_ {
        self.types.values().map(|entry| entry.tag_type)
    }

    /// Drops all tags and the learned type tree.
    pub fn clear(&mut self) {
        self.types.clear();
        self.children.clear();
    }

    fn register_type(&mut self, tag_type: TagType) {
        if self.types.contains_key(&tag_type.id) {
            return;
        }
        debug!(tag_type = tag_type.name, "registering randomizer tag type");
        self.types.insert(tag_type.id, TypeEntry::new(tag_type));

        let mut child = tag_type;
        while let Some(parent) = child.parent() {
            let siblings = self.children.entry(parent.id).or_default();
            if !siblings.contains(&child.id) {
                siblings.insert(child.id);
            }
            if self.types.contains_key(&parent.id) {
                break;
            }
            self.types.insert(parent.id, TypeEntry::new(parent));
            child = parent;
        }
    }

    fn visit_order(&self, root: TypeId, include_subclasses: bool) -> Vec<TypeId> {
        if !include_subclasses {
            return vec![root];
        }
        let mut order = Vec::new();
        let mut stack = vec![root];
        while let Some(type_id) = stack.pop() {
            order.push(type_id);
            if let Some(children) = self.children.get(&type_id) {
                let mut kids: Vec<TypeId> = children.iter().copied().collect();
                kids.reverse();
                stack.extend(kids);
            }
        }
        order
    }
}

impl fmt::Debug for TagManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for entry in self.types.values() {
            map.entry(&entry.tag_type.name, &entry.objects.len());
        }
        map.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Shape;
    impl RandomizerTag for Shape {}

    #[derive(Debug, PartialEq)]
    struct Cube(u32);
    impl RandomizerTag for Cube {
        fn base() -> Option<TagType> {
            Some(TagType::of::<Shape>())
        }
    }

    #[derive(Debug, PartialEq)]
    struct Sphere(u32);
    impl RandomizerTag for Sphere {
        fn base() -> Option<TagType> {
            Some(TagType::of::<Shape>())
        }
    }

    struct SmallCube;
    impl RandomizerTag for SmallCube {
        fn base() -> Option<TagType> {
            Some(TagType::of::<Cube>())
        }
    }

    struct Light;
    impl RandomizerTag for Light {}

    #[test]
    fn subclass_query_returns_derived_tags_in_insertion_order() {
        let mut tags = TagManager::new();
        for i in 0..5 {
            tags.add_tag(ObjectId(i), Cube(i as u32));
        }

        let with = tags.query::<Shape>(true);
        assert_eq!(with.len(), 5);
        let objects: Vec<u64> = with.iter().map(|t| t.object.0).collect();
        assert_eq!(objects, vec![0, 1, 2, 3, 4]);
        assert!(with.iter().all(|t| t.tag_type == TagType::of::<Cube>()));

        assert!(tags.query::<Shape>(false).is_empty());
    }

    #[test]
    fn subclass_query_is_depth_first() {
        let mut tags = TagManager::new();
        tags.add_tag(ObjectId(1), Cube(1));
        tags.add_tag(ObjectId(2), Sphere(2));
        tags.add_tag(ObjectId(3), SmallCube);
        tags.add_tag(ObjectId(4), Shape);

        let order: Vec<u64> = tags
            .query::<Shape>(true)
            .iter()
            .map(|t| t.object.0)
            .collect();
        // Shape itself, then Cube and its SmallCube child, then Sphere.
        assert_eq!(order, vec![4, 1, 3, 2]);
        assert_eq!(tags.count::<Shape>(true), 4);
        assert_eq!(tags.count::<Cube>(true), 2);
        assert_eq!(tags.count::<Cube>(false), 1);
    }

    #[test]
    fn downcast_recovers_concrete_tags() {
        let mut tags = TagManager::new();
        tags.add_tag(ObjectId(9), Sphere(42));
        let found = tags.query::<Shape>(true);
        assert_eq!(found[0].downcast::<Sphere>(), Some(&Sphere(42)));
        assert!(found[0].downcast::<Cube>().is_none());
    }

    #[test]
    fn removing_absent_tag_is_a_no_op() {
        let mut tags = TagManager::new();
        assert!(tags.remove_tag::<Cube>(ObjectId(1)).is_none());
        tags.add_tag(ObjectId(1), Cube(1));
        assert!(tags.remove_tag::<Sphere>(ObjectId(1)).is_none());
        assert_eq!(tags.remove_tag::<Cube>(ObjectId(1)), Some(Cube(1)));
        assert!(tags.remove_tag::<Cube>(ObjectId(1)).is_none());
        assert_eq!(tags.count::<Cube>(false), 0);
    }

    #[test]
    fn re_adding_replaces_value_and_keeps_position() {
        let mut tags = TagManager::new();
        tags.add_tag(ObjectId(1), Cube(1));
        tags.add_tag(ObjectId(2), Cube(2));
        tags.add_tag(ObjectId(1), Cube(10));
        let found: Vec<(u64, u32)> = tags
            .query_exact::<Cube>()
            .map(|(o, c)| (o.0, c.0))
            .collect();
        assert_eq!(found, vec![(1, 10), (2, 2)]);
    }

    #[test]
    fn removed_then_readded_objects_move_to_the_end() {
        let mut tags = TagManager::new();
        for id in 1..=3 {
            tags.add_tag(ObjectId(id), Cube(id as u32));
        }
        tags.remove_tag::<Cube>(ObjectId(1));
        tags.add_tag(ObjectId(1), Cube(7));
        let order: Vec<u64> = tags.objects_with::<Cube>().iter().map(|o| o.0).collect();
        assert_eq!(order, vec![2, 3, 1]);
    }

    #[test]
    fn remove_object_detaches_all_of_its_tags() {
        let mut tags = TagManager::new();
        tags.add_tag(ObjectId(1), Cube(1));
        tags.add_tag(ObjectId(1), Light);
        tags.add_tag(ObjectId(2), Light);
        assert_eq!(tags.remove_object(ObjectId(1)), 2);
        assert!(!tags.contains::<Cube>(ObjectId(1)));
        assert_eq!(tags.objects_with::<Light>(), vec![ObjectId(2)]);
    }

    #[test]
    fn get_mut_edits_tag_in_place() {
        let mut tags = TagManager::new();
        tags.add_tag(ObjectId(5), Cube(1));
        if let Some(cube) = tags.get_mut::<Cube>(ObjectId(5)) {
            cube.0 = 99;
        }
        assert_eq!(tags.get::<Cube>(ObjectId(5)), Some(&Cube(99)));
    }

    #[test]
    fn unrelated_types_do_not_leak_into_queries() {
        let mut tags = TagManager::new();
        tags.add_tag(ObjectId(1), Light);
        tags.add_tag(ObjectId(2), Cube(2));
        assert_eq!(tags.count::<Shape>(true), 1);
        assert_eq!(tags.count::<Light>(true), 1);
        assert!(TagType::of::<SmallCube>().is_a(TagType::of::<Shape>()));
        assert!(!TagType::of::<Light>().is_a(TagType::of::<Shape>()));
    }

    #[test]
    fn clear_forgets_types_and_tags() {
        let mut tags = TagManager::new();
        tags.add_tag(ObjectId(1), SmallCube);
        tags.clear();
        assert_eq!(tags.count::<Shape>(true), 0);
        assert_eq!(tags.known_types().count(), 0);
    }
}
