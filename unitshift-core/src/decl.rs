/// Host-assigned identity of one declaration node.
///
/// The engine never attaches hidden state to host AST nodes; instead the host
/// hands over a stable identity and the per-document context tracks processed
/// declarations in its own set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeclarationId(pub u64);

/// Host-assigned identity of the rule owning a declaration. Keys the
/// per-document selector-blacklist cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RuleId(pub u64);

/// A sibling declaration inside the same rule, used for the duplicate guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sibling<'a> {
    pub prop: &'a str,
    pub value: &'a str,
}

/// One declaration as seen by the engine: opaque strings plus identities.
///
/// `selector` is `None` for declarations outside any rule; `siblings` may
/// include the declaration itself (its old value never collides with a
/// rewritten one, see the no-change guard).
#[derive(Debug, Clone, Copy)]
pub struct DeclarationView<'a> {
    pub id: DeclarationId,
    pub prop: &'a str,
    pub value: &'a str,
    pub selector: Option<&'a str>,
    pub rule: Option<RuleId>,
    pub siblings: &'a [Sibling<'a>],
}

/// True iff a declaration with exactly this property and value already
/// exists among `siblings`.
pub fn declaration_exists(siblings: &[Sibling<'_>], prop: &str, value: &str) -> bool {
    siblings.iter().any(|s| s.prop == prop && s.value == value)
}
