//! "Looks like a service" heuristic
//!
//! A service implementation is a `public static` method taking a
//! `DispatchContext` and a context map. Only the unresolved parameter
//! signatures are compared, so any type that happens to be spelled
//! `DispatchContext` or `Map` matches as well.

use crate::parser::MethodSymbol;

/// Signature of the first parameter
const DISPATCH_CONTEXT: &str = "QDispatchContext;";

/// Accepted encodings of the second parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapSignature {
    /// `Map<String, Object>`
    StringToObject,
    /// `Map<String, ? extends Object>`
    StringToBoundedObject,
    /// `Map<String, ?>`
    StringToWildcard,
    /// `Map`
    Raw,
}

impl MapSignature {
    pub const ALL: [MapSignature; 4] = [
        MapSignature::StringToObject,
        MapSignature::StringToBoundedObject,
        MapSignature::StringToWildcard,
        MapSignature::Raw,
    ];

    pub fn encoding(&self) -> &'static str {
        match self {
            MapSignature::StringToObject => "QMap<QString;QObject;>;",
            MapSignature::StringToBoundedObject => "QMap<QString;+QObject;>;",
            MapSignature::StringToWildcard => "QMap<QString;*>;",
            MapSignature::Raw => "QMap;",
        }
    }

    pub fn from_encoding(signature: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.encoding() == signature)
    }
}

/// Whether `method` has the shape of a service implementation
pub fn looks_like_service(method: &dyn MethodSymbol) -> bool {
    if !method.is_static() || !method.is_public() {
        return false;
    }
    match method.parameter_signatures() {
        [context, map] => context == DISPATCH_CONTEXT && MapSignature::from_encoding(map).is_some(),
        _ => false,
    }
}
