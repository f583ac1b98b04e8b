//! Registered class tables standing in for runtime reflection
//!
//! Every type reachable from an expression declares its public methods,
//! readable/writable fields, supertypes and (for enums) constants in a
//! [`TypeRegistry`]. Property access and method overload resolution work
//! against these tables.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::model::{ElType, ElValue, EnumConstant, ObjectError, TypeHierarchy};

/// Result of calling into host code
pub type HostResult<T> = Result<T, ObjectError>;

/// Callable behind a registered method; receives the target and the
/// already converted arguments (a trailing varargs array included)
pub type MethodInvoker = Arc<dyn Fn(&ElValue, &[ElValue]) -> HostResult<ElValue> + Send + Sync>;

/// Reads a field of the target
pub type FieldGetter = Arc<dyn Fn(&ElValue) -> HostResult<ElValue> + Send + Sync>;

/// Writes a field of the target
pub type FieldSetter = Arc<dyn Fn(&ElValue, ElValue) -> HostResult<()> + Send + Sync>;

/// Name of the root class
pub const OBJECT_CLASS: &str = "java.lang.Object";

/// A public method of a registered class
#[derive(Clone)]
pub struct MethodDescriptor {
    /// Method name
    pub name: String,
    /// Class declaring the method
    pub declaring_class: Arc<str>,
    /// Parameter types; for varargs methods the last one is an array type
    pub parameter_types: Vec<ElType>,
    /// Whether the last parameter is variable-arity
    pub varargs: bool,
    /// Return type
    pub return_type: ElType,
    invoker: MethodInvoker,
}

impl MethodDescriptor {
    /// Number of declared parameters
    pub fn arity(&self) -> usize {
        self.parameter_types.len()
    }

    /// Element type of the varargs parameter
    pub fn varargs_element(&self) -> Option<&ElType> {
        if !self.varargs {
            return None;
        }
        match self.parameter_types.last() {
            Some(ElType::Array(element)) => Some(element),
            _ => None,
        }
    }

    /// Call the method
    pub fn invoke(&self, target: &ElValue, args: &[ElValue]) -> HostResult<ElValue> {
        (self.invoker)(target, args)
    }
}

impl fmt::Debug for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}

impl fmt::Display for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}.{}(", self.return_type, self.declaring_class, self.name)?;
        for (i, param) in self.parameter_types.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            match (self.varargs && i + 1 == self.parameter_types.len(), param) {
                (true, ElType::Array(element)) => write!(f, "{element}...")?,
                _ => write!(f, "{param}")?,
            }
        }
        write!(f, ")")
    }
}

/// A public field of a registered class
#[derive(Clone)]
pub struct FieldDescriptor {
    /// Field name
    pub name: String,
    /// Declared type
    pub field_type: ElType,
    getter: FieldGetter,
    setter: Option<FieldSetter>,
}

impl FieldDescriptor {
    /// Read the field
    pub fn get(&self, target: &ElValue) -> HostResult<ElValue> {
        (self.getter)(target)
    }

    /// Whether the field can be written
    pub fn is_writable(&self) -> bool {
        self.setter.is_some()
    }

    /// Write the field; `Ok(false)` when it is read-only
    pub fn set(&self, target: &ElValue, value: ElValue) -> HostResult<bool> {
        match &self.setter {
            Some(setter) => setter(target, value).map(|_| true),
            None => Ok(false),
        }
    }
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("field_type", &self.field_type)
            .field("writable", &self.is_writable())
            .finish()
    }
}

/// Class, interface or enum declaration
#[derive(Debug, Clone)]
pub struct ClassDescriptor {
    /// Class name
    pub name: Arc<str>,
    /// Direct superclass and interfaces
    pub supertypes: Vec<Arc<str>>,
    /// Declared methods
    pub methods: Vec<Arc<MethodDescriptor>>,
    /// Public fields
    pub fields: IndexMap<String, FieldDescriptor>,
    /// Whether this is an enum
    pub is_enum: bool,
    /// Enum constants in declaration order
    pub enum_constants: Vec<EnumConstant>,
}

/// Builder for [`ClassDescriptor`]
pub struct ClassBuilder {
    descriptor: ClassDescriptor,
}

impl ClassBuilder {
    /// Start a class declaration
    pub fn new(name: impl AsRef<str>) -> Self {
        Self {
            descriptor: ClassDescriptor {
                name: Arc::from(name.as_ref()),
                supertypes: Vec::new(),
                methods: Vec::new(),
                fields: IndexMap::new(),
                is_enum: false,
                enum_constants: Vec::new(),
            },
        }
    }

    /// Start an enum declaration with its constants
    pub fn enumeration<S: AsRef<str>>(
        name: impl AsRef<str>,
        constants: impl IntoIterator<Item = S>,
    ) -> Self {
        let mut builder = Self::new(name);
        let type_name = builder.descriptor.name.clone();
        builder.descriptor.is_enum = true;
        builder.descriptor.enum_constants = constants
            .into_iter()
            .enumerate()
            .map(|(ordinal, constant)| EnumConstant {
                type_name: type_name.clone(),
                name: Arc::from(constant.as_ref()),
                ordinal: ordinal as i32,
                display: None,
            })
            .collect();
        builder
    }

    /// `toString()` overrides of enum constants
    pub fn display_names<N: AsRef<str>, D: AsRef<str>>(
        mut self,
        names: impl IntoIterator<Item = (N, D)>,
    ) -> Self {
        for (name, display) in names {
            if let Some(constant) = self
                .descriptor
                .enum_constants
                .iter_mut()
                .find(|c| &*c.name == name.as_ref())
            {
                constant.display = Some(Arc::from(display.as_ref()));
            }
        }
        self
    }

    /// Declare a superclass or implemented interface
    pub fn extends(mut self, parent: impl AsRef<str>) -> Self {
        self.descriptor.supertypes.push(Arc::from(parent.as_ref()));
        self
    }

    /// Declare a fixed-arity method
    pub fn method<F>(
        self,
        name: impl Into<String>,
        parameter_types: impl IntoIterator<Item = ElType>,
        return_type: ElType,
        invoker: F,
    ) -> Self
    where
        F: Fn(&ElValue, &[ElValue]) -> HostResult<ElValue> + Send + Sync + 'static,
    {
        self.push_method(name, parameter_types, false, return_type, Arc::new(invoker))
    }

    /// Declare a variable-arity method; the last parameter type is the
    /// element type of the trailing array
    pub fn varargs_method<F>(
        self,
        name: impl Into<String>,
        parameter_types: impl IntoIterator<Item = ElType>,
        return_type: ElType,
        invoker: F,
    ) -> Self
    where
        F: Fn(&ElValue, &[ElValue]) -> HostResult<ElValue> + Send + Sync + 'static,
    {
        let mut parameter_types: Vec<ElType> = parameter_types.into_iter().collect();
        if let Some(last) = parameter_types.pop() {
            parameter_types.push(ElType::array_of(last));
        }
        self.push_method(name, parameter_types, true, return_type, Arc::new(invoker))
    }

    /// Declare a method of a host object type `T`; the target is downcast
    /// before `invoker` runs
    pub fn method_on<T, F>(
        self,
        name: impl Into<String>,
        parameter_types: impl IntoIterator<Item = ElType>,
        return_type: ElType,
        invoker: F,
    ) -> Self
    where
        T: 'static,
        F: Fn(&T, &[ElValue]) -> HostResult<ElValue> + Send + Sync + 'static,
    {
        let class = self.descriptor.name.clone();
        self.method(name, parameter_types, return_type, move |target, args| {
            let object = target.downcast_object::<T>().ok_or_else(|| {
                ObjectError::new(format!(
                    "{} is not an instance of {class}",
                    target.class_name()
                ))
            })?;
            invoker(object, args)
        })
    }

    fn push_method(
        mut self,
        name: impl Into<String>,
        parameter_types: impl IntoIterator<Item = ElType>,
        varargs: bool,
        return_type: ElType,
        invoker: MethodInvoker,
    ) -> Self {
        self.descriptor.methods.push(Arc::new(MethodDescriptor {
            name: name.into(),
            declaring_class: self.descriptor.name.clone(),
            parameter_types: parameter_types.into_iter().collect(),
            varargs,
            return_type,
            invoker,
        }));
        self
    }

    /// Declare a read-only public field
    pub fn field<G>(self, name: impl Into<String>, field_type: ElType, getter: G) -> Self
    where
        G: Fn(&ElValue) -> HostResult<ElValue> + Send + Sync + 'static,
    {
        self.push_field(name.into(), field_type, Arc::new(getter), None)
    }

    /// Declare a writable public field
    pub fn field_rw<G, S>(
        self,
        name: impl Into<String>,
        field_type: ElType,
        getter: G,
        setter: S,
    ) -> Self
    where
        G: Fn(&ElValue) -> HostResult<ElValue> + Send + Sync + 'static,
        S: Fn(&ElValue, ElValue) -> HostResult<()> + Send + Sync + 'static,
    {
        self.push_field(name.into(), field_type, Arc::new(getter), Some(Arc::new(setter)))
    }

    fn push_field(
        mut self,
        name: String,
        field_type: ElType,
        getter: FieldGetter,
        setter: Option<FieldSetter>,
    ) -> Self {
        self.descriptor.fields.insert(
            name.clone(),
            FieldDescriptor {
                name,
                field_type,
                getter,
                setter,
            },
        );
        self
    }

    /// Finish the declaration
    pub fn build(self) -> ClassDescriptor {
        self.descriptor
    }
}

/// Registry of class declarations
#[derive(Debug, Clone)]
pub struct TypeRegistry {
    classes: FxHashMap<Arc<str>, ClassDescriptor>,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeRegistry {
    /// Registry with the built-in classes (`String`, numbers, `List`,
    /// `Map`, `Enum`, `JsonNode`, `Object`)
    pub fn new() -> Self {
        let mut registry = Self::empty();
        super::builtin_classes::register_builtin_classes(&mut registry);
        registry
    }

    /// Registry without any class
    pub fn empty() -> Self {
        Self {
            classes: FxHashMap::default(),
        }
    }

    /// Register a class, replacing an earlier declaration of the same name
    pub fn register(&mut self, class: ClassDescriptor) {
        self.classes.insert(class.name.clone(), class);
    }

    /// Declaration of a class
    pub fn get(&self, name: &str) -> Option<&ClassDescriptor> {
        self.classes.get(name)
    }

    /// Whether the class is registered
    pub fn contains(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    /// Classes searched for members of a value of type `ty`, most derived
    /// first and [`OBJECT_CLASS`] last
    pub fn lineage(&self, ty: &ElType) -> Vec<Arc<str>> {
        let start: Vec<Arc<str>> = match ty {
            ElType::Primitive(kind) | ElType::Boxed(kind) => {
                let mut names = vec![Arc::from(kind.boxed_name())];
                if kind.is_numeric() {
                    names.push(Arc::from("java.lang.Number"));
                }
                names
            }
            ElType::BigInteger | ElType::BigDecimal => {
                vec![Arc::from(ty.name()), Arc::from("java.lang.Number")]
            }
            ElType::Array(_) | ElType::Object => Vec::new(),
            ElType::Class(name) => vec![name.clone()],
            other => vec![Arc::from(other.name())],
        };

        let mut seen = FxHashSet::default();
        let mut lineage = Vec::new();
        let mut queue: VecDeque<Arc<str>> = start.into();
        while let Some(name) = queue.pop_front() {
            if !seen.insert(name.clone()) {
                continue;
            }
            if let Some(class) = self.classes.get(&name) {
                queue.extend(class.supertypes.iter().cloned());
                if class.is_enum {
                    queue.push_back(Arc::from("java.lang.Enum"));
                }
            }
            lineage.push(name);
        }
        if seen.insert(Arc::from(OBJECT_CLASS)) {
            lineage.push(Arc::from(OBJECT_CLASS));
        }
        lineage
    }

    /// Public methods called `name` visible on type `ty`; an override hides
    /// the inherited method with the same parameter types
    pub fn methods_named(&self, ty: &ElType, name: &str) -> Vec<Arc<MethodDescriptor>> {
        let mut methods: Vec<Arc<MethodDescriptor>> = Vec::new();
        for class_name in self.lineage(ty) {
            let Some(class) = self.classes.get(&class_name) else {
                continue;
            };
            for method in class.methods.iter().filter(|m| m.name == name) {
                let overridden = methods
                    .iter()
                    .any(|m| m.parameter_types == method.parameter_types);
                if !overridden {
                    methods.push(method.clone());
                }
            }
        }
        methods
    }

    /// Public field `name` visible on type `ty`
    pub fn field(&self, ty: &ElType, name: &str) -> Option<&FieldDescriptor> {
        self.lineage(ty)
            .iter()
            .filter_map(|class| self.classes.get(class))
            .find_map(|class| class.fields.get(name))
    }
}

impl TypeHierarchy for TypeRegistry {
    fn is_subtype_of(&self, class: &str, ancestor: &str) -> bool {
        if class == ancestor || ancestor == OBJECT_CLASS {
            return true;
        }
        self.lineage(&ElType::class(class))
            .iter()
            .any(|name| &**name == ancestor)
    }

    fn is_enum_type(&self, class: &str) -> bool {
        self.classes.get(class).is_some_and(|c| c.is_enum)
    }

    fn enum_constant(&self, class: &str, name: &str) -> Option<EnumConstant> {
        self.classes
            .get(class)?
            .enum_constants
            .iter()
            .find(|c| &*c.name == name)
            .cloned()
    }
}
