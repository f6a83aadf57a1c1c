//! Object construction actions.

use std::{collections::HashMap, fmt, rc::Rc};
use thiserror::Error;
use trellis_core::{
    Action, ActionError, ActionResult, Attributes, Bindable, BoxError, Context,
};

/// Errors raised while constructing objects.
#[derive(Error, Debug)]
pub enum CreateError {
    /// No constructor is registered under the requested type name.
    #[error("no constructor registered for type `{0}`")]
    UnknownType(String),

    /// The constructor ran and failed.
    #[error(transparent)]
    Failed(BoxError),
}

impl From<CreateError> for ActionError {
    fn from(err: CreateError) -> Self {
        ActionError::Factory(err.to_string())
    }
}

type Constructor = Box<dyn Fn() -> Box<dyn Bindable>>;

/// A table of named constructors.
///
/// Lets documents choose the concrete type of an object by name, through an
/// override attribute of [`ObjectCreate`].
#[derive(Default)]
pub struct ObjectFactory {
    constructors: HashMap<String, Constructor>,
}

impl ObjectFactory {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `constructor` under `name`, replacing any previous one.
    pub fn register<T, F>(&mut self, name: &str, constructor: F) -> &mut Self
    where
        T: Bindable,
        F: Fn() -> T + 'static,
    {
        self.constructors
            .insert(name.to_owned(), Box::new(move || Box::new(constructor())));
        self
    }

    /// Builder-style [`register`](Self::register).
    pub fn with<T, F>(mut self, name: &str, constructor: F) -> Self
    where
        T: Bindable,
        F: Fn() -> T + 'static,
    {
        self.register(name, constructor);
        self
    }

    /// Constructs the type registered under `name`.
    pub fn create(&self, name: &str) -> Result<Box<dyn Bindable>, CreateError> {
        self.constructors
            .get(name)
            .map(|constructor| constructor())
            .ok_or_else(|| CreateError::UnknownType(name.to_owned()))
    }

    /// Whether a constructor is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.constructors.contains_key(name)
    }
}

impl fmt::Debug for ObjectFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.constructors.keys().collect();
        names.sort();
        f.debug_struct("ObjectFactory").field("types", &names).finish()
    }
}

enum Source {
    Constructor(Constructor),
    Named(String),
}

/// Constructs an object when the element opens and settles it when the
/// element closes.
///
/// The object is pushed in `begin`. In `end` it is popped and handed to a
/// pending link (see [`SetNext`](crate::actions::SetNext)), retained as the
/// result root if it was the bottom-most object, or dropped.
pub struct ObjectCreate {
    source: Source,
    types: Option<Rc<ObjectFactory>>,
    type_attribute: Option<String>,
}

impl ObjectCreate {
    /// Constructs with `constructor` on every match.
    pub fn of<T, F>(constructor: F) -> Self
    where
        T: Bindable,
        F: Fn() -> T + 'static,
    {
        Self {
            source: Source::Constructor(Box::new(move || Box::new(constructor()))),
            types: None,
            type_attribute: None,
        }
    }

    /// Constructs the type registered as `type_name` in `types`.
    pub fn named(types: Rc<ObjectFactory>, type_name: &str) -> Self {
        Self {
            source: Source::Named(type_name.to_owned()),
            types: Some(types),
            type_attribute: None,
        }
    }

    /// Lets the element choose the type: when `attribute` is present, its
    /// value names the constructor to use from `types`.
    pub fn with_type_attribute(mut self, attribute: &str, types: Rc<ObjectFactory>) -> Self {
        self.type_attribute = Some(attribute.to_owned());
        self.types = Some(types);
        self
    }

    fn construct(&self, attributes: &Attributes) -> Result<Box<dyn Bindable>, CreateError> {
        let chosen = self
            .type_attribute
            .as_deref()
            .and_then(|attribute| attributes.get(attribute));
        let name = match (chosen, &self.source) {
            (Some(name), _) => name,
            (None, Source::Named(name)) => name.as_str(),
            (None, Source::Constructor(constructor)) => return Ok(constructor()),
        };
        match &self.types {
            Some(types) => types.create(name),
            None => Err(CreateError::UnknownType(name.to_owned())),
        }
    }
}

impl fmt::Debug for ObjectCreate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let source = match &self.source {
            Source::Constructor(_) => "<constructor>",
            Source::Named(name) => name.as_str(),
        };
        f.debug_struct("ObjectCreate")
            .field("source", &source)
            .field("type_attribute", &self.type_attribute)
            .finish()
    }
}

impl Action for ObjectCreate {
    fn begin(
        &mut self,
        ctx: &mut Context,
        _namespace: &str,
        _name: &str,
        attributes: &Attributes,
    ) -> ActionResult {
        let object = self.construct(attributes)?;
        ctx.push(object);
        Ok(())
    }

    fn end(&mut self, ctx: &mut Context, _namespace: &str, _name: &str) -> ActionResult {
        ctx.pop_and_settle()
    }
}

/// Builds objects from the attributes of the matched element.
pub trait CreationFactory {
    /// Creates the object for an element with `attributes`.
    fn create(&mut self, attributes: &Attributes) -> Result<Box<dyn Bindable>, BoxError>;
}

impl<F> CreationFactory for F
where
    F: FnMut(&Attributes) -> Result<Box<dyn Bindable>, BoxError>,
{
    fn create(&mut self, attributes: &Attributes) -> Result<Box<dyn Bindable>, BoxError> {
        self(attributes)
    }
}

/// Like [`ObjectCreate`], but delegates construction to a [`CreationFactory`].
///
/// With [`ignore_create_errors`](Self::ignore_create_errors), a failing
/// factory is logged and the element pushes nothing.
pub struct FactoryCreate<F> {
    factory: F,
    ignore_create_errors: bool,
    pushed: Vec<bool>,
}

impl<F: CreationFactory> FactoryCreate<F> {
    /// Creates objects with `factory`.
    pub fn new(factory: F) -> Self {
        Self {
            factory,
            ignore_create_errors: false,
            pushed: Vec::new(),
        }
    }

    /// Logs factory failures instead of aborting the run.
    pub fn ignore_create_errors(mut self, ignore: bool) -> Self {
        self.ignore_create_errors = ignore;
        self
    }
}

impl<F> fmt::Debug for FactoryCreate<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FactoryCreate")
            .field("ignore_create_errors", &self.ignore_create_errors)
            .finish_non_exhaustive()
    }
}

impl<F: CreationFactory> Action for FactoryCreate<F> {
    fn begin(
        &mut self,
        ctx: &mut Context,
        _namespace: &str,
        name: &str,
        attributes: &Attributes,
    ) -> ActionResult {
        match self.factory.create(attributes) {
            Ok(object) => {
                ctx.push(object);
                self.pushed.push(true);
                Ok(())
            }
            Err(err) if self.ignore_create_errors => {
                tracing::warn!(path = %ctx.path(), element = name, error = %err, "factory failed, skipping element");
                self.pushed.push(false);
                Ok(())
            }
            Err(err) => Err(CreateError::Failed(err).into()),
        }
    }

    fn end(&mut self, ctx: &mut Context, _namespace: &str, _name: &str) -> ActionResult {
        match self.pushed.pop() {
            Some(true) => ctx.pop_and_settle(),
            _ => Ok(()),
        }
    }

    fn finish(&mut self, _ctx: &mut Context) -> ActionResult {
        self.pushed.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_core::Attribute;

    #[derive(Debug, Default)]
    struct Plain;
    impl Bindable for Plain {}

    #[derive(Debug, Default)]
    struct Fancy;
    impl Bindable for Fancy {}

    #[test]
    fn object_create_pushes_and_retains_root() {
        let mut ctx = Context::default();
        let mut action = ObjectCreate::of(Plain::default);
        action.begin(&mut ctx, "", "a", &Attributes::new()).unwrap();
        assert_eq!(ctx.depth(), 1);
        action.end(&mut ctx, "", "a").unwrap();
        assert_eq!(ctx.depth(), 0);
        assert!(ctx.take_root().unwrap().is::<Plain>());
    }

    #[test]
    fn type_attribute_overrides_constructor() {
        let types = Rc::new(ObjectFactory::new().with("fancy", Fancy::default));
        let mut action = ObjectCreate::of(Plain::default).with_type_attribute("type", types);

        let mut ctx = Context::default();
        let mut attrs = Attributes::new();
        attrs.push(Attribute::new("type", "fancy"));
        action.begin(&mut ctx, "", "a", &attrs).unwrap();
        assert!(ctx.peek().unwrap().is::<Fancy>());

        action.begin(&mut ctx, "", "a", &Attributes::new()).unwrap();
        assert!(ctx.peek().unwrap().is::<Plain>());
    }

    #[test]
    fn unknown_type_name_fails() {
        let types = Rc::new(ObjectFactory::new());
        let mut action = ObjectCreate::named(types, "missing");
        let err = action
            .begin(&mut Context::default(), "", "a", &Attributes::new())
            .unwrap_err();
        assert!(matches!(err, ActionError::Factory(ref msg) if msg.contains("missing")));
    }

    #[test]
    fn factory_errors_can_be_ignored() {
        let failing = |_: &Attributes| -> Result<Box<dyn Bindable>, BoxError> { Err("boom".into()) };
        let mut action = FactoryCreate::new(failing).ignore_create_errors(true);
        let mut ctx = Context::default();
        ctx.push(Box::new(Plain));

        action.begin(&mut ctx, "", "a", &Attributes::new()).unwrap();
        assert_eq!(ctx.depth(), 1);
        action.end(&mut ctx, "", "a").unwrap();
        assert_eq!(ctx.depth(), 1, "nothing pushed, nothing popped");
    }

    #[test]
    fn factory_errors_abort_by_default() {
        let failing = |_: &Attributes| -> Result<Box<dyn Bindable>, BoxError> { Err("boom".into()) };
        let mut action = FactoryCreate::new(failing);
        let err = action
            .begin(&mut Context::default(), "", "a", &Attributes::new())
            .unwrap_err();
        assert!(matches!(err, ActionError::Factory(_)));
    }

    #[test]
    fn factory_sees_attributes() {
        #[derive(Debug)]
        struct Counted(usize);
        impl Bindable for Counted {}

        let mut action = FactoryCreate::new(|attrs: &Attributes| -> Result<Box<dyn Bindable>, BoxError> {
            Ok(Box::new(Counted(attrs.len())))
        });
        let mut ctx = Context::default();
        let attrs: Attributes = [("a", "1"), ("b", "2")].into_iter().collect();
        action.begin(&mut ctx, "", "x", &attrs).unwrap();
        let top = ctx.peek().and_then(|o| o.downcast_ref::<Counted>()).unwrap();
        assert_eq!(top.0, 2);
    }
}
