//! Memoized type descriptors.

mod host;
mod instance;

pub use host::{FieldHostSerialization, HostSerialization, NoHostSerialization};

use alloc::borrow::ToOwned;
use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt;

use crate::attribute::{HideInInspector, InspectorButton};
use crate::attribute::{NonSerialized, NotSerialized, Serializable, SerializeField};
use crate::descriptor::{MemberDescriptor, MethodDescriptor, TypeDescriptor, TypeShape};
use crate::hash::{HashMap, HashSet};
use crate::info::{MemberDef, MemberFlags, TypeKind};
use crate::settings::InspectorSettings;
use crate::universe::{TypeKey, TypeUniverse};

// -----------------------------------------------------------------------------
// TypeMetadataCache

/// Builds and memoizes a [`TypeDescriptor`] for every requested type.
///
/// Descriptors are built on first request and shared afterwards. Building
/// a type requests its base type first, so inherited members come from
/// the cached base descriptor.
///
/// The only mutation after startup is [`remove_member`](Self::remove_member),
/// which must run before descriptors are handed out to long-lived users:
/// descriptors already obtained are not updated.
///
/// # Examples
///
/// ```
/// use vc_meta::{InspectorSettings, MemberDef, TypeDef, TypeMetadataCache, TypeUniverse};
///
/// let cache = TypeMetadataCache::new(TypeUniverse::new(), InspectorSettings::default());
/// let universe = cache.universe();
///
/// let point = universe.define(
///     TypeDef::class("Point")
///         .member(MemberDef::field("X", "i32"))
///         .member(MemberDef::field("Y", "i32")),
/// ).unwrap();
/// let point3d = universe.define(
///     TypeDef::class("Point3D").extends("Point").member(MemberDef::field("Z", "i32")),
/// ).unwrap();
///
/// let names = |ty| {
///     let descriptor = cache.get(ty);
///     descriptor.members().iter().map(|m| m.name().to_owned()).collect::<Vec<_>>()
/// };
/// assert_eq!(names(point3d), ["X", "Y", "Z"]);
///
/// assert!(cache.remove_member(point, "Y"));
/// assert_eq!(names(point), ["X"]);
/// assert_eq!(names(point3d), ["X", "Z"]);
/// ```
pub struct TypeMetadataCache {
    universe: TypeUniverse,
    settings: InspectorSettings,
    host: Box<dyn HostSerialization>,
    descriptors: RefCell<HashMap<TypeKey, Rc<TypeDescriptor>>>,
    removed: RefCell<HashMap<TypeKey, Vec<String>>>,
    building: RefCell<HashSet<TypeKey>>,
}

impl TypeMetadataCache {
    /// Creates a cache that assumes the host persists nothing.
    pub fn new(universe: TypeUniverse, settings: InspectorSettings) -> Self {
        Self {
            universe,
            settings,
            host: Box::new(NoHostSerialization),
            descriptors: RefCell::new(HashMap::default()),
            removed: RefCell::new(HashMap::default()),
            building: RefCell::new(HashSet::default()),
        }
    }

    /// Replaces the host serialization probe and drops cached descriptors.
    pub fn with_host(mut self, host: impl HostSerialization + 'static) -> Self {
        self.host = Box::new(host);
        self.descriptors.get_mut().clear();
        self
    }

    #[inline]
    pub fn universe(&self) -> &TypeUniverse {
        &self.universe
    }

    #[inline]
    pub fn settings(&self) -> &InspectorSettings {
        &self.settings
    }

    #[inline]
    pub fn settings_mut(&mut self) -> &mut InspectorSettings {
        &mut self.settings
    }

    /// Returns the descriptor of `ty`, building it on first request.
    pub fn get(&self, ty: TypeKey) -> Rc<TypeDescriptor> {
        if let Some(descriptor) = self.descriptors.borrow().get(&ty) {
            return Rc::clone(descriptor);
        }

        self.building.borrow_mut().insert(ty);
        let descriptor = Rc::new(self.build(ty));
        self.building.borrow_mut().remove(&ty);

        self.descriptors
            .borrow_mut()
            .insert(ty, Rc::clone(&descriptor));
        descriptor
    }

    /// Returns `true` if the descriptor of `ty` is currently cached.
    #[inline]
    pub fn is_cached(&self, ty: TypeKey) -> bool {
        self.descriptors.borrow().contains_key(&ty)
    }

    /// Removes the member `name` from `ty` and every type deriving from it.
    ///
    /// Descriptors of affected types are rebuilt on their next request and
    /// never list the member again. Returns `true` if `ty` had the member.
    pub fn remove_member(&self, ty: TypeKey, name: &str) -> bool {
        let existed = self.get(ty).member(name).is_some();

        {
            let mut removed = self.removed.borrow_mut();
            let names = removed.entry(ty).or_default();
            if !names.iter().any(|n| n == name) {
                names.push(name.to_owned());
            }
        }

        self.descriptors
            .borrow_mut()
            .retain(|&key, _| key != ty && !self.universe.ancestors(key).contains(&ty));

        log::debug!("Removed member `{name}` from `{}`", self.universe.name(ty));
        existed
    }

    /// Drops every cached descriptor and every removal.
    pub fn reset(&self) {
        self.descriptors.borrow_mut().clear();
        self.removed.borrow_mut().clear();
    }

    // -------------------------------------------------------------------------
    // Building

    fn build(&self, ty: TypeKey) -> TypeDescriptor {
        let universe = &self.universe;
        let def = universe.def(ty);

        let shape = match def.kind() {
            TypeKind::Array { element } => TypeShape::Array { element },
            _ => match universe.collection_element(ty) {
                Some(element) => TypeShape::Collection { element },
                None => TypeShape::Object,
            },
        };

        let parent = universe.base_of(ty).filter(|base| {
            let cyclic = self.building.borrow().contains(base);
            if cyclic {
                log::error!("Inheritance cycle detected at `{}`", def.name());
            }
            !cyclic
        });

        let mut descriptor = TypeDescriptor {
            ty,
            name: String::from(def.name()),
            shape,
            parent,
            local_members: Vec::new(),
            members: Vec::new(),
            serialized_members: Vec::new(),
            name_index: HashMap::default(),
            methods: Vec::new(),
            buttons: Vec::new(),
            local_buttons: Vec::new(),
            has_default_constructor: self.compute_has_default_constructor(ty),
        };

        if shape.is_container() || def.generic_param_count() > 0 {
            return descriptor;
        }

        let removed = self.removed.borrow().get(&ty).cloned().unwrap_or_default();
        let is_kept = |member: &MemberDescriptor| !removed.iter().any(|n| n == member.name());
        let parent = parent.map(|parent| self.get(parent));

        // Members
        let mut local: Vec<Rc<MemberDescriptor>> = def
            .members()
            .iter()
            .filter_map(|member| self.inspectable_member(ty, member))
            .filter(|member| is_kept(member))
            .map(Rc::new)
            .collect();
        local.sort_by(|a, b| a.order().total_cmp(&b.order()));

        let mut members: Vec<Rc<MemberDescriptor>> = parent
            .as_ref()
            .map(|parent| parent.members.clone())
            .unwrap_or_default();
        members.retain(|member| is_kept(member));
        members.extend(local.iter().cloned());
        members.sort_by(|a, b| a.order().total_cmp(&b.order()));

        descriptor.serialized_members = members
            .iter()
            .filter(|member| Self::is_serialized(member))
            .filter(|member| !self.host.handles(universe, member))
            .cloned()
            .collect();

        for member in &members {
            descriptor
                .name_index
                .insert(String::from(member.name()), Rc::clone(member));
        }
        descriptor.local_members = local;
        descriptor.members = members;

        // Methods
        let mut local_methods = Vec::with_capacity(def.methods().len());
        for method in def.methods() {
            let params = method
                .params()
                .iter()
                .map(|param| universe.resolve(param))
                .collect::<Result<Vec<_>, _>>();
            match params {
                Ok(params) => {
                    local_methods.push(Rc::new(MethodDescriptor::new(ty, method, params)));
                }
                Err(e) => log::error!(
                    "Method `{}::{}` is dropped: {e}",
                    def.name(),
                    method.name()
                ),
            }
        }

        let mut local_buttons: Vec<_> = local_methods
            .iter()
            .filter(|method| method.attributes().contains::<InspectorButton>())
            .cloned()
            .collect();
        local_buttons.sort_by(|a, b| a.order().total_cmp(&b.order()));

        let mut buttons = parent
            .as_ref()
            .map(|parent| parent.buttons.clone())
            .unwrap_or_default();
        buttons.extend(local_buttons.iter().cloned());
        buttons.sort_by(|a, b| a.order().total_cmp(&b.order()));

        let mut methods = parent
            .as_ref()
            .map(|parent| parent.methods.clone())
            .unwrap_or_default();
        methods.extend(
            local_methods
                .into_iter()
                .filter(|method| !method.attributes().contains::<HideInInspector>()),
        );

        descriptor.methods = methods;
        descriptor.buttons = buttons;
        descriptor.local_buttons = local_buttons;
        descriptor
    }

    /// Filters out members that are never inspected.
    fn inspectable_member(&self, ty: TypeKey, member: &MemberDef) -> Option<MemberDescriptor> {
        let flags = member.flags();
        if flags.intersects(
            MemberFlags::STATIC | MemberFlags::COMPILER_GENERATED | MemberFlags::INDEXER,
        ) {
            return None;
        }
        if flags.contains(MemberFlags::PROPERTY)
            && !flags.contains(MemberFlags::READABLE | MemberFlags::WRITABLE)
        {
            return None;
        }

        let storage = match self.universe.resolve(member.ty()) {
            Ok(storage) => storage,
            Err(e) => {
                log::error!(
                    "Member `{}::{}` is dropped: {e}",
                    self.universe.name(ty),
                    member.name()
                );
                return None;
            }
        };
        if self.universe.is_delegate(storage) {
            return None;
        }
        Some(MemberDescriptor::new(ty, member, storage))
    }

    /// Explicit markers win over the visibility default.
    fn is_serialized(member: &MemberDescriptor) -> bool {
        let attributes = member.attributes();
        if attributes.contains::<NonSerialized>() || attributes.contains::<NotSerialized>() {
            return false;
        }
        if attributes.contains::<SerializeField>() || attributes.contains::<Serializable>() {
            return true;
        }
        member.is_public()
    }

    fn compute_has_default_constructor(&self, ty: TypeKey) -> bool {
        matches!(self.universe.kind(ty), TypeKind::Array { .. })
            || self.universe.is_value_type(ty)
            || self.universe.def(ty).default_ctor().is_some()
    }
}

impl fmt::Debug for TypeMetadataCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeMetadataCache")
            .field("types", &self.universe.len())
            .field("cached", &self.descriptors.borrow().len())
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}
