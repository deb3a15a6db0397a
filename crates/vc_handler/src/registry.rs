use alloc::borrow::ToOwned;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt;

use vc_meta::hash::HashMap;
use vc_meta::info::TypeKind;
use vc_meta::{MemberDescriptor, TypeKey, TypeMetadataCache, TypeUniverse};

use crate::{DecoratorRegistry, DecoratorSet, Handler, HandlerChain, HandlerError};
use crate::{HandlerTarget, NamedTarget};

// -----------------------------------------------------------------------------
// HandlerRequest

/// What a factory is asked to build a handler for.
#[derive(Clone, Copy)]
pub struct HandlerRequest<'a> {
    pub cache: &'a TypeMetadataCache,
    pub ty: TypeKey,
}

/// Builds a handler for a request; errors drop the candidate.
pub type HandlerFactory<H> = Rc<dyn Fn(&HandlerRequest<'_>) -> Result<Rc<H>, HandlerError>>;

/// Builds the composite handler for a member carrying decorators.
pub type Composer<H> = Rc<dyn Fn(DecoratorSet<H>, HandlerChain<H>) -> Rc<H>>;

struct Entry<H: ?Sized> {
    name: String,
    target: HandlerTarget,
    factory: HandlerFactory<H>,
}

// -----------------------------------------------------------------------------
// HandlerRegistry

/// Registered handlers of one family and the chains resolved from them.
///
/// Registration happens at startup; chains are memoized per type and the
/// memo is cleared whenever a registration changes.
///
/// # Examples
///
/// ```
/// use std::rc::Rc;
/// use vc_handler::{Handler, HandlerKind, HandlerRegistry, HandlerRequest, HandlerTarget};
/// use vc_meta::{InspectorSettings, TypeMetadataCache, TypeUniverse};
///
/// trait Editor: Handler {}
/// struct IntEditor;
/// struct Reflected;
/// impl Handler for IntEditor {}
/// impl Handler for Reflected {}
/// impl Editor for IntEditor {}
/// impl Editor for Reflected {}
///
/// let cache = TypeMetadataCache::new(TypeUniverse::new(), InspectorSettings::default());
/// let i32 = cache.universe().builtins().i32;
///
/// let mut registry = HandlerRegistry::<dyn Editor>::new();
/// registry.register(cache.universe(), "int", HandlerTarget::Exact(i32), Rc::new(
///     |_: &HandlerRequest<'_>| Ok(Rc::new(IntEditor) as Rc<dyn Editor>),
/// ));
/// registry.set_reflected(Rc::new(
///     |_: &HandlerRequest<'_>| Ok(Rc::new(Reflected) as Rc<dyn Editor>),
/// ));
///
/// let chain = registry.resolve(&cache, i32).unwrap();
/// assert_eq!(chain.first().kind(), HandlerKind::of::<IntEditor>());
/// assert_eq!(chain.len(), 2);
/// ```
pub struct HandlerRegistry<H: ?Sized + Handler> {
    entries: Vec<Entry<H>>,
    reflected: Option<HandlerFactory<H>>,
    container: Option<HandlerFactory<H>>,
    chooser: Option<HandlerFactory<H>>,
    decorators: DecoratorRegistry<H>,
    composer: Option<Composer<H>>,
    chains: RefCell<HashMap<TypeKey, HandlerChain<H>>>,
    members: RefCell<HashMap<TypeKey, HashMap<String, HandlerChain<H>>>>,
}

impl<H: ?Sized + Handler> Default for HandlerRegistry<H> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<H: ?Sized + Handler> HandlerRegistry<H> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            reflected: None,
            container: None,
            chooser: None,
            decorators: DecoratorRegistry::new(),
            composer: None,
            chains: RefCell::new(HashMap::default()),
            members: RefCell::new(HashMap::default()),
        }
    }

    /// Registers a handler factory.
    ///
    /// An invalid target is logged and the registration dropped.
    pub fn register(
        &mut self,
        universe: &TypeUniverse,
        name: &str,
        target: HandlerTarget,
        factory: HandlerFactory<H>,
    ) -> bool {
        if let Err(e) = target.validate(universe, name) {
            log::error!("{e}");
            return false;
        }
        self.entries.push(Entry {
            name: name.to_owned(),
            target,
            factory,
        });
        self.invalidate();
        true
    }

    /// Registers a handler factory whose target names its type.
    ///
    /// Unknown names are logged and the registration dropped.
    pub fn register_named(
        &mut self,
        universe: &TypeUniverse,
        name: &str,
        target: NamedTarget,
        factory: HandlerFactory<H>,
    ) -> bool {
        match target.resolve(universe, name) {
            Ok(target) => self.register(universe, name, target, factory),
            Err(e) => {
                log::error!("{e}");
                false
            }
        }
    }

    /// Sets the fallback for plain objects.
    pub fn set_reflected(&mut self, factory: HandlerFactory<H>) {
        self.reflected = Some(factory);
        self.invalidate();
    }

    /// Sets the fallback for arrays and collections.
    pub fn set_container(&mut self, factory: HandlerFactory<H>) {
        self.container = Some(factory);
        self.invalidate();
    }

    /// Sets the wrapper used for types with several possible instance types.
    pub fn set_chooser(&mut self, factory: HandlerFactory<H>) {
        self.chooser = Some(factory);
        self.invalidate();
    }

    /// Sets the function composing decorators with a member's chain.
    pub fn set_composer(&mut self, composer: Composer<H>) {
        self.composer = Some(composer);
        self.members.get_mut().clear();
    }

    #[inline]
    pub fn decorators(&self) -> &DecoratorRegistry<H> {
        &self.decorators
    }

    #[inline]
    pub fn decorators_mut(&mut self) -> &mut DecoratorRegistry<H> {
        self.members.get_mut().clear();
        &mut self.decorators
    }

    /// Number of registered handlers, fallbacks excluded.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Drops memoized chains.
    pub fn clear_cache(&self) {
        self.chains.borrow_mut().clear();
        self.members.borrow_mut().clear();
    }

    fn invalidate(&mut self) {
        self.chains.get_mut().clear();
        self.members.get_mut().clear();
    }

    /// Returns the chain of handlers for `ty`, most specific first.
    ///
    /// # Errors
    ///
    /// - [`HandlerError::Unsupported`] if no handler applies.
    pub fn resolve(
        &self,
        cache: &TypeMetadataCache,
        ty: TypeKey,
    ) -> Result<HandlerChain<H>, HandlerError> {
        if let Some(chain) = self.chains.borrow().get(&ty) {
            return Ok(chain.clone());
        }

        let entries = self.collect(cache, ty);
        let chain = HandlerChain::new(entries)
            .ok_or_else(|| HandlerError::Unsupported(cache.universe().name(ty)))?;
        self.chains.borrow_mut().insert(ty, chain.clone());
        Ok(chain)
    }

    /// Returns the chain for a member, led by its decorators if it has any.
    ///
    /// Chains are memoized per declaring type and member name.
    pub fn resolve_member(
        &self,
        cache: &TypeMetadataCache,
        member: &MemberDescriptor,
    ) -> Result<HandlerChain<H>, HandlerError> {
        if let Some(chain) = self
            .members
            .borrow()
            .get(&member.declaring())
            .and_then(|members| members.get(member.name()))
        {
            return Ok(chain.clone());
        }

        let chain = self.resolve(cache, member.storage())?;
        let set = self
            .composer
            .as_ref()
            .and_then(|composer| Some((composer, self.decorators.select(member.attributes())?)));
        let chain = match set {
            Some((composer, set)) => chain.prepend(composer(set, chain.clone())),
            None => chain,
        };
        self.members
            .borrow_mut()
            .entry(member.declaring())
            .or_default()
            .insert(member.name().to_owned(), chain.clone());
        Ok(chain)
    }

    fn collect(&self, cache: &TypeMetadataCache, ty: TypeKey) -> Vec<Rc<H>> {
        let universe = cache.universe();
        let request = HandlerRequest { cache, ty };
        let mut result = Vec::new();

        // 1. chooser
        if let Some(chooser) = &self.chooser
            && Self::needs_chooser(cache, ty)
        {
            Self::push(&mut result, "chooser", chooser, &request);
        }

        // 2. exact
        for entry in &self.entries {
            let exact = matches!(
                entry.target,
                HandlerTarget::Exact(t) | HandlerTarget::Inherited(t) if t == ty
            );
            if exact {
                Self::push(&mut result, &entry.name, &entry.factory, &request);
            }
        }

        // 3. generic
        let definition = universe.generic_definition(ty);
        let is_array = matches!(universe.kind(ty), TypeKind::Array { .. });
        for entry in &self.entries {
            let matched = match entry.target {
                HandlerTarget::Generic(def) => definition == Some(def),
                HandlerTarget::Array => is_array,
                _ => false,
            };
            if matched {
                Self::push(&mut result, &entry.name, &entry.factory, &request);
            }
        }

        // 4. inherited, nearest base first
        let mut bases = universe.ancestors(ty);
        bases.extend(universe.all_interfaces(ty));
        for base in bases {
            let base_definition = universe.generic_definition(base);
            for entry in &self.entries {
                let HandlerTarget::Inherited(target) = entry.target else {
                    continue;
                };
                if target != base && base_definition != Some(target) {
                    continue;
                }
                if let Some(handler) = Self::create(&entry.name, &entry.factory, &request)
                    && handler.can_handle(ty, cache)
                {
                    result.push(handler);
                }
            }
        }

        // 5. fallback
        if let Some(inner) = universe.nullable_element(ty) {
            match self.resolve(cache, inner) {
                Ok(chain) => result.extend(chain.iter().cloned()),
                Err(e) => log::error!("{e}"),
            }
        } else {
            let fallback = if cache.get(ty).is_collection() {
                &self.container
            } else {
                &self.reflected
            };
            if let Some(factory) = fallback {
                Self::push(&mut result, "fallback", factory, &request);
            }
        }
        result
    }

    fn needs_chooser(cache: &TypeMetadataCache, ty: TypeKey) -> bool {
        let universe = cache.universe();
        if universe.is_generic_definition(ty) || universe.nullable_element(ty).is_some() {
            return false;
        }
        match universe.kind(ty) {
            TypeKind::Class | TypeKind::Interface => {
                universe.is_abstract(ty) || universe.creatable_types_deriving(ty).len() > 1
            }
            _ => false,
        }
    }

    fn create(
        name: &str,
        factory: &HandlerFactory<H>,
        request: &HandlerRequest<'_>,
    ) -> Option<Rc<H>> {
        match factory(request) {
            Ok(handler) => Some(handler),
            Err(e) => {
                log::error!("Handler `{name}` dropped: {e}");
                None
            }
        }
    }

    fn push(
        result: &mut Vec<Rc<H>>,
        name: &str,
        factory: &HandlerFactory<H>,
        request: &HandlerRequest<'_>,
    ) {
        if let Some(handler) = Self::create(name, factory, request) {
            result.push(handler);
        }
    }
}

impl<H: ?Sized + Handler> fmt::Debug for HandlerRegistry<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field(
                "entries",
                &self
                    .entries
                    .iter()
                    .map(|e| (&e.name, e.target))
                    .collect::<Vec<_>>(),
            )
            .field("decorators", &self.decorators)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::{HandlerFactory, HandlerRegistry, HandlerRequest};
    use crate::{DecoratorSet, Handler, HandlerChain, HandlerError, HandlerKind};
    use crate::{HandlerTarget, NamedTarget};
    use alloc::rc::Rc;
    use alloc::string::String;
    use core::cell::Cell;
    use vc_meta::{Attribute, InspectorSettings, MemberDef, TypeDef};
    use vc_meta::{TypeKey, TypeMetadataCache, TypeUniverse};

    trait Stub: Handler {}

    macro_rules! stubs {
        ($($name:ident),*) => {$(
            struct $name;
            impl Handler for $name {}
            impl Stub for $name {}
        )*};
    }

    stubs!(IntStub, NullableStub, ListStub, ArrayStub, Reflected, Container, Chooser, Composed);

    struct Note;
    impl Handler for Note {
        fn is_decorator(&self) -> bool {
            true
        }
    }
    impl Stub for Note {}

    #[derive(Debug)]
    struct Noted;
    impl Attribute for Noted {}

    fn compose(_: DecoratorSet<dyn Stub>, _: HandlerChain<dyn Stub>) -> Rc<dyn Stub> {
        Rc::new(Composed)
    }

    /// Only handles types named `Special`.
    struct Picky;
    impl Handler for Picky {
        fn can_handle(&self, ty: TypeKey, cache: &TypeMetadataCache) -> bool {
            cache.universe().name(ty) == "Special"
        }
    }
    impl Stub for Picky {}

    fn factory<T: Stub>(make: fn() -> T) -> HandlerFactory<dyn Stub> {
        Rc::new(move |_: &HandlerRequest<'_>| Ok(Rc::new(make()) as Rc<dyn Stub>))
    }

    fn setup() -> (TypeMetadataCache, HandlerRegistry<dyn Stub>) {
        let cache = TypeMetadataCache::new(TypeUniverse::new(), InspectorSettings::default());
        let universe = cache.universe();
        let b = *universe.builtins();

        let mut registry = HandlerRegistry::<dyn Stub>::new();
        registry.register(universe, "int", HandlerTarget::Exact(b.i32), factory(|| IntStub));
        registry.register(
            universe,
            "nullable",
            HandlerTarget::Generic(b.nullable),
            factory(|| NullableStub),
        );
        registry.register(universe, "list", HandlerTarget::Generic(b.list), factory(|| ListStub));
        registry.register(universe, "array", HandlerTarget::Array, factory(|| ArrayStub));
        registry.set_reflected(factory(|| Reflected));
        registry.set_container(factory(|| Container));
        registry.set_chooser(factory(|| Chooser));
        (cache, registry)
    }

    #[test]
    fn nullable_wraps_the_inner_chain() {
        let (cache, registry) = setup();
        let b = *cache.universe().builtins();
        let nullable = cache.universe().instantiate(b.nullable, &[b.i32]).unwrap();

        let chain = registry.resolve(&cache, nullable).unwrap();
        assert_eq!(chain.first().kind(), HandlerKind::of::<NullableStub>());
        assert_eq!(
            chain.skip_until_not(&[HandlerKind::of::<NullableStub>()]).kind(),
            HandlerKind::of::<IntStub>()
        );
        assert_eq!(
            chain.kinds(),
            [
                HandlerKind::of::<NullableStub>(),
                HandlerKind::of::<IntStub>(),
                HandlerKind::of::<Reflected>(),
            ]
        );
    }

    #[test]
    fn generic_and_container_fallbacks() {
        let (cache, registry) = setup();
        let b = *cache.universe().builtins();
        let list = cache.universe().instantiate(b.list, &[b.string]).unwrap();
        let array = cache.universe().array_of(b.i32);

        assert_eq!(
            registry.resolve(&cache, list).unwrap().kinds(),
            [HandlerKind::of::<ListStub>(), HandlerKind::of::<Container>()]
        );
        assert_eq!(
            registry.resolve(&cache, array).unwrap().kinds(),
            [HandlerKind::of::<ArrayStub>(), HandlerKind::of::<Container>()]
        );
    }

    #[test]
    fn chooser_leads_polymorphic_types() {
        let (cache, registry) = setup();
        let universe = cache.universe();
        let shape = universe.define(TypeDef::interface("IShape")).unwrap();
        let circle = universe.define(TypeDef::class("Circle").implements("IShape")).unwrap();

        let chain = registry.resolve(&cache, shape).unwrap();
        assert_eq!(chain.first().kind(), HandlerKind::of::<Chooser>());

        // Only one creatable type, not abstract.
        let chain = registry.resolve(&cache, circle).unwrap();
        assert_eq!(chain.kinds(), [HandlerKind::of::<Reflected>()]);

        universe.define(TypeDef::class("Ring").extends("Circle")).unwrap();
        registry.clear_cache();
        let chain = registry.resolve(&cache, circle).unwrap();
        assert_eq!(chain.first().kind(), HandlerKind::of::<Chooser>());
    }

    #[test]
    fn inherited_handlers_require_opt_in() {
        let (cache, mut registry) = setup();
        let universe = cache.universe();
        let base = universe.define(TypeDef::class("Base").abstract_type()).unwrap();
        let special = universe.define(TypeDef::class("Special").extends("Base")).unwrap();
        let other = universe.define(TypeDef::class("Other").extends("Base")).unwrap();

        registry.register(universe, "exact-base", HandlerTarget::Exact(base), factory(|| IntStub));
        registry.register(universe, "picky", HandlerTarget::Inherited(base), factory(|| Picky));

        let kinds = registry.resolve(&cache, special).unwrap().kinds();
        assert_eq!(kinds, [HandlerKind::of::<Picky>(), HandlerKind::of::<Reflected>()]);

        let kinds = registry.resolve(&cache, other).unwrap().kinds();
        assert_eq!(kinds, [HandlerKind::of::<Reflected>()]);
    }

    #[test]
    fn failing_factories_and_targets_are_dropped() {
        let (cache, mut registry) = setup();
        let universe = cache.universe();
        let b = *universe.builtins();

        let bad = HandlerTarget::Generic(b.i32);
        assert!(!registry.register(universe, "bad", bad, factory(|| IntStub)));
        assert!(!registry.register_named(
            universe,
            "unknown",
            NamedTarget::Exact("Missing"),
            factory(|| IntStub)
        ));
        registry.register(
            universe,
            "broken",
            HandlerTarget::Exact(b.i64),
            Rc::new(|_: &HandlerRequest<'_>| {
                Err(HandlerError::Construction {
                    handler: String::from("broken"),
                    message: String::from("boom"),
                })
            }),
        );

        let kinds = registry.resolve(&cache, b.i64).unwrap().kinds();
        assert_eq!(kinds, [HandlerKind::of::<Reflected>()]);
    }

    #[test]
    fn empty_registry_is_unsupported() {
        let cache = TypeMetadataCache::new(TypeUniverse::new(), InspectorSettings::default());
        let registry = HandlerRegistry::<dyn Stub>::new();
        let i32 = cache.universe().builtins().i32;
        assert_eq!(
            registry.resolve(&cache, i32).unwrap_err(),
            HandlerError::Unsupported(String::from("i32"))
        );
    }

    #[test]
    fn member_chains_are_memoized() {
        let (cache, mut registry) = setup();
        let built = Rc::new(Cell::new(0));
        let counter = built.clone();
        registry.decorators_mut().register_attribute::<Noted>(false, move |_| {
            counter.set(counter.get() + 1);
            Rc::new(Note) as Rc<dyn Stub>
        });
        registry.set_composer(Rc::new(compose));

        let ty = cache
            .universe()
            .define(
                TypeDef::class("Labelled")
                    .member(MemberDef::field("count", "i32").with_attribute(Noted))
                    .member(MemberDef::field("plain", "i32")),
            )
            .unwrap();
        let descriptor = cache.get(ty);
        let count = descriptor.member("count").unwrap();
        let plain = descriptor.member("plain").unwrap();

        for _ in 0..3 {
            let kinds = registry.resolve_member(&cache, count).unwrap().kinds();
            assert_eq!(
                kinds,
                [
                    HandlerKind::of::<Composed>(),
                    HandlerKind::of::<IntStub>(),
                    HandlerKind::of::<Reflected>(),
                ]
            );
        }
        assert_eq!(built.get(), 1);

        let kinds = registry.resolve_member(&cache, plain).unwrap().kinds();
        assert_eq!(kinds, [HandlerKind::of::<IntStub>(), HandlerKind::of::<Reflected>()]);

        registry.clear_cache();
        registry.resolve_member(&cache, count).unwrap();
        assert_eq!(built.get(), 2);
    }
}
