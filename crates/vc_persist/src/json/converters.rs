use alloc::rc::Rc;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use serde_json::{Map, Number};
use vc_handler::{Handler, HandlerError, HandlerKind, HandlerRequest};
use vc_meta::info::PrimitiveKind;
use vc_meta::{MetaError, SeqRef, TypeKey, TypeUniverse, Value};

use super::{ConvertContext, Json, REF_KEY, TYPE_KEY, TokenConverter, VALUE_KEY};
use crate::SerializeError;

fn unexpected(universe: &TypeUniverse, ty: TypeKey, expected: &'static str) -> SerializeError {
    SerializeError::UnexpectedToken {
        ty: universe.name(ty),
        expected,
    }
}

fn construction(handler: &str, universe: &TypeUniverse, ty: TypeKey) -> HandlerError {
    HandlerError::Construction {
        handler: String::from(handler),
        message: universe.name(ty),
    }
}

// -----------------------------------------------------------------------------
// PrimitiveConverter

/// Booleans, characters, numbers and strings as JSON scalars.
#[derive(Debug)]
pub struct PrimitiveConverter {
    ty: TypeKey,
    kind: PrimitiveKind,
}

impl PrimitiveConverter {
    pub fn create(request: &HandlerRequest<'_>) -> Result<Rc<dyn TokenConverter>, HandlerError> {
        let universe = request.cache.universe();
        let kind = universe
            .primitive_kind(request.ty)
            .ok_or_else(|| construction("PrimitiveConverter", universe, request.ty))?;
        Ok(Rc::new(Self {
            ty: request.ty,
            kind,
        }))
    }

    fn expected(&self) -> &'static str {
        match self.kind {
            PrimitiveKind::Bool => "a boolean",
            PrimitiveKind::Char => "a single character",
            PrimitiveKind::I32 => "a 32-bit integer",
            PrimitiveKind::I64 => "an integer",
            PrimitiveKind::F32 | PrimitiveKind::F64 => "a finite number",
            PrimitiveKind::String => "a string",
        }
    }
}

impl Handler for PrimitiveConverter {}

impl TokenConverter for PrimitiveConverter {
    fn to_json(&self, cx: &mut ConvertContext<'_>, value: &Value) -> Result<Json, SerializeError> {
        let json = match (self.kind, value) {
            (PrimitiveKind::String, Value::Null) => Some(Json::Null),
            (PrimitiveKind::Bool, Value::Bool(v)) => Some(Json::Bool(*v)),
            (PrimitiveKind::Char, Value::Char(c)) => Some(Json::String(c.to_string())),
            (PrimitiveKind::I32 | PrimitiveKind::I64, Value::Int(v)) => Some(Json::from(*v)),
            (PrimitiveKind::F32 | PrimitiveKind::F64, Value::Float(v)) => {
                Number::from_f64(*v).map(Json::Number)
            }
            (PrimitiveKind::String, Value::Str(s)) => Some(Json::String(s.clone())),
            _ => None,
        };
        json.ok_or_else(|| unexpected(cx.cache().universe(), self.ty, self.expected()))
    }

    fn from_json(&self, cx: &mut ConvertContext<'_>, json: &Json) -> Result<Value, SerializeError> {
        let value = match (self.kind, json) {
            (PrimitiveKind::String, Json::Null) => Some(Value::Null),
            (PrimitiveKind::Bool, Json::Bool(v)) => Some(Value::Bool(*v)),
            (PrimitiveKind::Char, Json::String(s)) => {
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Some(Value::Char(c)),
                    _ => None,
                }
            }
            (PrimitiveKind::I32, Json::Number(n)) => n
                .as_i64()
                .filter(|v| i32::try_from(*v).is_ok())
                .map(Value::Int),
            (PrimitiveKind::I64, Json::Number(n)) => n.as_i64().map(Value::Int),
            (PrimitiveKind::F32 | PrimitiveKind::F64, Json::Number(n)) => {
                n.as_f64().map(Value::Float)
            }
            (PrimitiveKind::String, Json::String(s)) => Some(Value::Str(s.clone())),
            _ => None,
        };
        value.ok_or_else(|| unexpected(cx.cache().universe(), self.ty, self.expected()))
    }
}

// -----------------------------------------------------------------------------
// NullableConverter

/// `Nullable<T>`: JSON null, or the token of `T`.
#[derive(Debug)]
pub struct NullableConverter {
    ty: TypeKey,
}

impl NullableConverter {
    pub fn create(request: &HandlerRequest<'_>) -> Result<Rc<dyn TokenConverter>, HandlerError> {
        let universe = request.cache.universe();
        if universe.nullable_element(request.ty).is_none() {
            return Err(construction("NullableConverter", universe, request.ty));
        }
        Ok(Rc::new(Self { ty: request.ty }))
    }

    fn next(&self, cx: &ConvertContext<'_>) -> Result<Rc<dyn TokenConverter>, SerializeError> {
        let chain = cx.converters().resolve(cx.cache(), self.ty)?;
        Ok(chain.skip_until_not(&[HandlerKind::of::<Self>()]).clone())
    }
}

impl Handler for NullableConverter {}

impl TokenConverter for NullableConverter {
    fn to_json(&self, cx: &mut ConvertContext<'_>, value: &Value) -> Result<Json, SerializeError> {
        if value.is_null() {
            return Ok(Json::Null);
        }
        self.next(cx)?.to_json(cx, value)
    }

    fn from_json(&self, cx: &mut ConvertContext<'_>, json: &Json) -> Result<Value, SerializeError> {
        if json.is_null() {
            return Ok(Value::Null);
        }
        self.next(cx)?.from_json(cx, json)
    }
}

// -----------------------------------------------------------------------------
// ExternalConverter

/// External objects as `{"$ref": id}`.
#[derive(Debug)]
pub struct ExternalConverter {
    ty: TypeKey,
}

impl ExternalConverter {
    pub fn create(request: &HandlerRequest<'_>) -> Result<Rc<dyn TokenConverter>, HandlerError> {
        Ok(Rc::new(Self { ty: request.ty }))
    }
}

impl Handler for ExternalConverter {}

impl TokenConverter for ExternalConverter {
    fn to_json(&self, cx: &mut ConvertContext<'_>, value: &Value) -> Result<Json, SerializeError> {
        match value {
            Value::Null => Ok(Json::Null),
            Value::External(object) => {
                let id = cx.refs().store(object);
                let mut map = Map::new();
                map.insert(String::from(REF_KEY), Json::from(id));
                Ok(Json::Object(map))
            }
            _ => Err(unexpected(cx.cache().universe(), self.ty, "an external object")),
        }
    }

    fn from_json(&self, cx: &mut ConvertContext<'_>, json: &Json) -> Result<Value, SerializeError> {
        if json.is_null() {
            return Ok(Value::Null);
        }
        let universe = cx.cache().universe();
        let id = json
            .get(REF_KEY)
            .and_then(Json::as_u64)
            .and_then(|id| usize::try_from(id).ok())
            .ok_or_else(|| unexpected(universe, self.ty, "a reference id"))?;
        let object = cx.refs().retrieve(id).ok_or(SerializeError::MissingReference(id))?;
        if !universe.is_assignable(self.ty, object.ty()) {
            return Err(SerializeError::NotAssignable {
                expected: universe.name(self.ty),
                found: universe.name(object.ty()),
            });
        }
        Ok(Value::External(object))
    }
}

// -----------------------------------------------------------------------------
// SequenceConverter

/// Arrays and collections as JSON arrays, elements by their declared type.
#[derive(Debug)]
pub struct SequenceConverter {
    ty: TypeKey,
    element: TypeKey,
}

impl SequenceConverter {
    pub fn create(request: &HandlerRequest<'_>) -> Result<Rc<dyn TokenConverter>, HandlerError> {
        let universe = request.cache.universe();
        let element = universe
            .collection_element(request.ty)
            .ok_or_else(|| construction("SequenceConverter", universe, request.ty))?;
        Ok(Rc::new(Self {
            ty: request.ty,
            element,
        }))
    }
}

impl Handler for SequenceConverter {}

impl TokenConverter for SequenceConverter {
    fn to_json(&self, cx: &mut ConvertContext<'_>, value: &Value) -> Result<Json, SerializeError> {
        let seq = match value {
            Value::Null => return Ok(Json::Null),
            Value::Seq(seq) => seq,
            _ => return Err(unexpected(cx.cache().universe(), self.ty, "a sequence")),
        };

        cx.enter(seq.identity(), seq.ty())?;
        let items: Result<Vec<_>, _> = seq
            .items()
            .iter()
            .map(|item| cx.to_json(self.element, item))
            .collect();
        cx.exit(seq.identity());
        Ok(Json::Array(items?))
    }

    fn from_json(&self, cx: &mut ConvertContext<'_>, json: &Json) -> Result<Value, SerializeError> {
        let items = match json {
            Json::Null => return Ok(Value::Null),
            Json::Array(items) => items,
            _ => return Err(unexpected(cx.cache().universe(), self.ty, "an array")),
        };
        let items = items
            .iter()
            .map(|item| cx.from_json(self.element, item))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Value::Seq(SeqRef::from_items(self.ty, items)))
    }
}

// -----------------------------------------------------------------------------
// ObjectConverter

/// Objects as JSON objects of their serialized members.
///
/// Also the fallback for declared types whose values have another runtime
/// type, such as `object` members holding numbers.
#[derive(Debug)]
pub struct ObjectConverter {
    ty: TypeKey,
}

impl ObjectConverter {
    pub fn create(request: &HandlerRequest<'_>) -> Result<Rc<dyn TokenConverter>, HandlerError> {
        Ok(Rc::new(Self { ty: request.ty }))
    }

    /// The type of an inline value, which does not carry one.
    fn inline_type(universe: &TypeUniverse, value: &Value) -> Option<TypeKey> {
        let b = universe.builtins();
        match value {
            Value::Bool(_) => Some(b.bool),
            Value::Int(_) => Some(b.i64),
            Value::Float(_) => Some(b.f64),
            Value::Char(_) => Some(b.char),
            Value::Str(_) => Some(b.string),
            _ => value.runtime_type(),
        }
    }

    fn write_members(
        &self,
        cx: &mut ConvertContext<'_>,
        value: &Value,
        ty: TypeKey,
    ) -> Result<Map<String, Json>, SerializeError> {
        let mut map = Map::new();
        for member in cx.cache().get(ty).serialized_members() {
            let current = member.try_read(value)?;
            let json = cx.to_json(member.storage(), &current)?;
            map.insert(member.name().to_string(), json);
        }
        Ok(map)
    }

    fn read_members(
        &self,
        cx: &mut ConvertContext<'_>,
        map: &Map<String, Json>,
    ) -> Result<Value, SerializeError> {
        let instance = cx.cache().create_instance(self.ty)?;
        for member in cx.cache().get(self.ty).serialized_members() {
            // Missing keys keep what the constructor set.
            if let Some(json) = map.get(member.name()) {
                let value = cx.from_json(member.storage(), json)?;
                member.try_write(cx.cache().universe(), &instance, value)?;
            }
        }
        Ok(instance)
    }
}

impl Handler for ObjectConverter {}

impl TokenConverter for ObjectConverter {
    fn to_json(&self, cx: &mut ConvertContext<'_>, value: &Value) -> Result<Json, SerializeError> {
        if value.is_null() {
            return Ok(Json::Null);
        }
        let universe = cx.cache().universe();
        let runtime = Self::inline_type(universe, value)
            .ok_or_else(|| unexpected(universe, self.ty, "an object"))?;

        if let Value::Object(object) = value {
            cx.enter(object.identity(), runtime)?;
            let map = self.write_members(cx, value, runtime);
            cx.exit(object.identity());
            let mut map = map?;
            if runtime != self.ty {
                map.insert(String::from(TYPE_KEY), Json::String(universe.name(runtime)));
            }
            return Ok(Json::Object(map));
        }
        if runtime == self.ty {
            return Err(unexpected(universe, self.ty, "an object"));
        }

        let inner = cx.to_json(runtime, value)?;
        let mut map = Map::new();
        map.insert(String::from(TYPE_KEY), Json::String(universe.name(runtime)));
        map.insert(String::from(VALUE_KEY), inner);
        Ok(Json::Object(map))
    }

    fn from_json(&self, cx: &mut ConvertContext<'_>, json: &Json) -> Result<Value, SerializeError> {
        let universe = cx.cache().universe();
        let map = match json {
            Json::Null => return Ok(Value::Null),
            Json::Object(map) => map,
            _ => return Err(unexpected(universe, self.ty, "an object")),
        };

        let Some(name) = map.get(TYPE_KEY) else {
            return self.read_members(cx, map);
        };
        let name = name
            .as_str()
            .ok_or_else(|| unexpected(universe, self.ty, "a type name"))?;
        let runtime = universe
            .lookup(name)
            .ok_or_else(|| MetaError::UnknownType(String::from(name)))?;
        if runtime == self.ty {
            return self.read_members(cx, map);
        }
        if !universe.is_assignable(self.ty, runtime) {
            return Err(SerializeError::NotAssignable {
                expected: universe.name(self.ty),
                found: String::from(name),
            });
        }
        match map.get(VALUE_KEY) {
            Some(inner) => cx.from_json(runtime, inner),
            None => cx.from_json(runtime, json),
        }
    }
}
