//! Entity scope for slot resolution.
//!
//! A [`ScopeConstraint`] says which entities a slot may refer to:
//!
//! 1. a base reachability set (visible, touchable, carried, nearby, all)
//! 2. narrowed by property and predicate filters, in order
//! 3. widened by explicitly listed entities
//! 4. widened by named scope extensions registered on the [`ScopeResolver`]
//!
//! The resolver then matches noun phrases, pronouns and multi-object phrases
//! ("all", "all but the lamp", "the key and the coin") against that set.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parley_foundation::{EntityId, LtMap, Value};
use parley_world::{Entity, TraitType, WorldModel};
use tracing::{debug, trace};

use crate::context::GrammarContext;
use crate::noun_phrase::{NounPhrase, best_matches};

/// Predicate filter over candidate entities.
pub type ScopePredicate = Arc<dyn Fn(&Entity, &GrammarContext<'_>) -> bool>;

/// Named function contributing extra entities to a scope.
pub type ScopeExtension = Arc<dyn Fn(&GrammarContext<'_>) -> Vec<EntityId>>;

/// Words that start an "all" phrase.
const ALL_WORDS: &[&str] = &["all", "every", "everything", "each"];
/// Words that start the exclusion list of an "all" phrase.
const EXCEPT_WORDS: &[&str] = &["but", "except"];

/// Base reachability for a slot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ScopeBase {
    /// The room and everything visible in it, plus inventory.
    #[default]
    Visible,
    /// Like visible, but only through open containers.
    Touchable,
    /// The actor's inventory, through open containers.
    Carried,
    /// Direct contents of the actor's room.
    Nearby,
    /// Every entity in the world.
    All,
}

/// A filter applied to the base set.
#[derive(Clone)]
pub enum ScopeFilter {
    /// Every listed property must equal the given value.
    ///
    /// A boolean value may also test for a trait by name (`container: true`).
    Property(LtMap<Arc<str>, Value>),
    /// A predicate that must return true.
    Function(ScopePredicate),
}

impl ScopeFilter {
    fn accepts(&self, entity: &Entity, context: &GrammarContext<'_>) -> bool {
        match self {
            Self::Property(props) => props
                .iter()
                .all(|(key, expected)| property_matches(entity, key, expected)),
            Self::Function(predicate) => predicate(entity, context),
        }
    }
}

fn property_matches(entity: &Entity, key: &str, expected: &Value) -> bool {
    if let Some(actual) = entity.property(key) {
        return actual == expected;
    }
    match expected {
        Value::Bool(wanted) => {
            let has = entity.traits().any(|t| t.trait_type().to_string() == key);
            has == *wanted
        }
        _ => false,
    }
}

impl fmt::Debug for ScopeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Property(props) => f.debug_tuple("Property").field(props).finish(),
            Self::Function(_) => f.write_str("Function(..)"),
        }
    }
}

/// Which entities a slot may refer to.
#[derive(Clone, Debug, Default)]
pub struct ScopeConstraint {
    /// Base reachability set.
    pub base: ScopeBase,
    /// Filters, applied in order.
    pub filters: Vec<ScopeFilter>,
    /// Entities always in scope.
    pub explicit: Vec<EntityId>,
    /// Names of scope extensions to union in.
    pub extensions: Vec<String>,
}

impl ScopeConstraint {
    /// Starts a builder.
    #[must_use]
    pub fn builder() -> ScopeConstraintBuilder {
        ScopeConstraintBuilder::new()
    }
}

/// Builds a [`ScopeConstraint`].
///
/// `build` takes a snapshot; the builder can keep being modified afterwards
/// without affecting constraints already built.
#[derive(Clone, Debug, Default)]
pub struct ScopeConstraintBuilder {
    constraint: ScopeConstraint,
}

impl ScopeConstraintBuilder {
    /// Creates a builder with a visible base.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Base: visible.
    pub fn visible(&mut self) -> &mut Self {
        self.constraint.base = ScopeBase::Visible;
        self
    }

    /// Base: touchable.
    pub fn touchable(&mut self) -> &mut Self {
        self.constraint.base = ScopeBase::Touchable;
        self
    }

    /// Base: carried.
    pub fn carried(&mut self) -> &mut Self {
        self.constraint.base = ScopeBase::Carried;
        self
    }

    /// Base: nearby.
    pub fn nearby(&mut self) -> &mut Self {
        self.constraint.base = ScopeBase::Nearby;
        self
    }

    /// Base: every entity.
    pub fn all(&mut self) -> &mut Self {
        self.constraint.base = ScopeBase::All;
        self
    }

    /// Requires a property (or trait, for booleans) to equal `value`.
    pub fn matching(&mut self, key: &str, value: impl Into<Value>) -> &mut Self {
        let props = LtMap::new().insert(Arc::from(key), value.into());
        self.constraint.filters.push(ScopeFilter::Property(props));
        self
    }

    /// Requires a predicate to hold.
    pub fn where_fn(
        &mut self,
        predicate: impl Fn(&Entity, &GrammarContext<'_>) -> bool + 'static,
    ) -> &mut Self {
        self.constraint
            .filters
            .push(ScopeFilter::Function(Arc::new(predicate)));
        self
    }

    /// Requires a trait.
    pub fn has_trait(&mut self, trait_type: TraitType) -> &mut Self {
        self.where_fn(move |entity, _| entity.has_trait(&trait_type))
    }

    /// Always includes these entities.
    pub fn also_include(&mut self, ids: impl IntoIterator<Item = EntityId>) -> &mut Self {
        self.constraint.explicit.extend(ids);
        self
    }

    /// Unions in a named scope extension.
    pub fn include_rule(&mut self, name: impl Into<String>) -> &mut Self {
        self.constraint.extensions.push(name.into());
        self
    }

    /// Snapshots the current state.
    #[must_use]
    pub fn build(&self) -> ScopeConstraint {
        self.constraint.clone()
    }
}

/// Outcome of resolving a slot's words against scope.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SlotResolution {
    /// Exactly one entity.
    Unique(EntityId),
    /// Several entities from "all" or a list.
    Multiple {
        /// Entities to act on, in scope order.
        entities: Vec<EntityId>,
        /// Entities named after "but"/"except" that were in the "all" set.
        excluded: Vec<EntityId>,
        /// Came from an "all" phrase (rather than a list).
        is_all: bool,
    },
    /// More than one equally good candidate.
    Ambiguous {
        /// The phrase that was ambiguous.
        text: String,
        /// The candidates.
        candidates: Vec<EntityId>,
    },
    /// Nothing in scope matched.
    NotFound {
        /// The phrase that found nothing.
        text: String,
    },
}

impl SlotResolution {
    /// Entities this resolution refers to (empty for failures).
    #[must_use]
    pub fn entities(&self) -> Vec<EntityId> {
        match self {
            Self::Unique(id) => vec![*id],
            Self::Multiple { entities, .. } => entities.clone(),
            Self::Ambiguous { .. } | Self::NotFound { .. } => Vec::new(),
        }
    }

    /// Returns true for `Unique` and `Multiple`.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Unique(_) | Self::Multiple { .. })
    }
}

/// Evaluates scope constraints and resolves slot phrases.
#[derive(Clone, Default)]
pub struct ScopeResolver {
    extensions: HashMap<String, ScopeExtension>,
}

impl ScopeResolver {
    /// Creates a resolver with no extensions.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers (or replaces) a named scope extension.
    pub fn register_extension(
        &mut self,
        name: impl Into<String>,
        extension: impl Fn(&GrammarContext<'_>) -> Vec<EntityId> + 'static,
    ) {
        self.extensions.insert(name.into(), Arc::new(extension));
    }

    /// Entities a constraint admits, in a stable order.
    #[must_use]
    pub fn candidates(&self, constraint: &ScopeConstraint, context: &GrammarContext<'_>) -> Vec<EntityId> {
        let world = context.world;
        let mut result: Vec<EntityId> = base_set(constraint.base, context)
            .into_iter()
            .filter(|id| {
                world
                    .entity(*id)
                    .is_some_and(|e| constraint.filters.iter().all(|f| f.accepts(e, context)))
            })
            .collect();

        for id in &constraint.explicit {
            if world.entity(*id).is_some() {
                push_unique(&mut result, *id);
            }
        }

        for name in &constraint.extensions {
            match self.extensions.get(name) {
                Some(extension) => {
                    for id in extension(context) {
                        if world.entity(id).is_some() {
                            push_unique(&mut result, id);
                        }
                    }
                }
                None => debug!(extension = %name, "unknown scope extension"),
            }
        }

        trace!(base = ?constraint.base, count = result.len(), "scope candidates");
        result
    }

    /// Best-tier matches for a name within a constraint.
    #[must_use]
    pub fn find_by_name(
        &self,
        name: &str,
        constraint: &ScopeConstraint,
        context: &GrammarContext<'_>,
    ) -> Vec<EntityId> {
        let words: Vec<String> = name.split_whitespace().map(str::to_lowercase).collect();
        let Some(phrase) = NounPhrase::parse(&words) else {
            return Vec::new();
        };
        let candidates = self.candidates(constraint, context);
        best_matches(context.world, &candidates, &phrase)
    }

    /// Resolves the (lowercase) words of an entity slot.
    #[must_use]
    pub fn resolve_slot(
        &self,
        words: &[String],
        constraint: &ScopeConstraint,
        context: &GrammarContext<'_>,
    ) -> SlotResolution {
        let text = crate::tokenizer::join_words(words);
        let candidates = self.candidates(constraint, context);

        if let [word] = words {
            if crate::pronouns::PronounState::is_pronoun(word) {
                return resolve_pronoun(word, &candidates, context);
            }
        }

        if words.first().is_some_and(|w| ALL_WORDS.contains(&w.as_str())) {
            return resolve_all(&words[1..], &text, &candidates, context);
        }

        let phrases = split_list(words);
        if phrases.len() > 1 {
            let mut entities = Vec::new();
            for phrase in &phrases {
                match resolve_phrase(phrase, &candidates, context) {
                    SlotResolution::Unique(id) => push_unique(&mut entities, id),
                    failure => return failure,
                }
            }
            return SlotResolution::Multiple {
                entities,
                excluded: Vec::new(),
                is_all: false,
            };
        }

        match phrases.first() {
            Some(phrase) => resolve_phrase(phrase, &candidates, context),
            None => resolve_phrase(words, &candidates, context),
        }
    }
}

impl fmt::Debug for ScopeResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.extensions.keys().collect();
        names.sort();
        f.debug_struct("ScopeResolver")
            .field("extensions", &names)
            .finish()
    }
}

fn push_unique(list: &mut Vec<EntityId>, id: EntityId) {
    if !list.contains(&id) {
        list.push(id);
    }
}

fn resolve_pronoun(word: &str, candidates: &[EntityId], context: &GrammarContext<'_>) -> SlotResolution {
    let referents = context
        .pronouns
        .and_then(|p| p.resolve(word))
        .unwrap_or_default();
    let in_scope: Vec<EntityId> = referents
        .into_iter()
        .filter(|id| candidates.contains(id))
        .collect();
    match in_scope.as_slice() {
        [] => SlotResolution::NotFound {
            text: word.to_string(),
        },
        [single] => SlotResolution::Unique(*single),
        _ => SlotResolution::Multiple {
            entities: in_scope,
            excluded: Vec::new(),
            is_all: false,
        },
    }
}

fn resolve_phrase<S: AsRef<str>>(
    words: &[S],
    candidates: &[EntityId],
    context: &GrammarContext<'_>,
) -> SlotResolution {
    let text = words.iter().map(AsRef::as_ref).collect::<Vec<_>>().join(" ");
    let Some(phrase) = NounPhrase::parse(words) else {
        return SlotResolution::NotFound { text };
    };
    let found = best_matches(context.world, candidates, &phrase);
    match found.as_slice() {
        [] => SlotResolution::NotFound { text },
        [single] => SlotResolution::Unique(*single),
        _ => SlotResolution::Ambiguous {
            text,
            candidates: found,
        },
    }
}

/// Resolves "all", "all X", "all but X and Y".
fn resolve_all(
    rest: &[String],
    text: &str,
    candidates: &[EntityId],
    context: &GrammarContext<'_>,
) -> SlotResolution {
    let world = context.world;
    let mut pool: Vec<EntityId> = candidates
        .iter()
        .copied()
        .filter(|id| *id != context.actor && !world.has_trait(*id, &TraitType::Room))
        .collect();

    let mut excluded = Vec::new();
    let rest: Vec<&str> = rest
        .iter()
        .map(String::as_str)
        .skip_while(|w| *w == "the")
        .collect();

    if let Some((first, exceptions)) = rest.split_first() {
        if EXCEPT_WORDS.contains(first) {
            for phrase in split_list(exceptions) {
                let Some(np) = NounPhrase::parse(&phrase) else {
                    continue;
                };
                for id in best_matches(world, &pool, &np) {
                    push_unique(&mut excluded, id);
                }
            }
            pool.retain(|id| !excluded.contains(id));
        } else if let Some(np) = NounPhrase::parse(&rest) {
            // "all coins": keep what the phrase names, allowing a plural head.
            let singular = np.noun.strip_suffix('s').map(|n| NounPhrase {
                adjectives: np.adjectives.clone(),
                noun: n.to_string(),
            });
            let mut named = best_matches(world, &pool, &np);
            if let Some(singular) = singular {
                for id in best_matches(world, &pool, &singular) {
                    push_unique(&mut named, id);
                }
            }
            pool.retain(|id| named.contains(id));
        }
    }

    if pool.is_empty() {
        return SlotResolution::NotFound {
            text: text.to_string(),
        };
    }
    SlotResolution::Multiple {
        entities: pool,
        excluded,
        is_all: true,
    }
}

/// Splits words on "and" and commas into phrases.
fn split_list<S: AsRef<str>>(words: &[S]) -> Vec<Vec<String>> {
    let mut phrases = vec![Vec::new()];
    for word in words {
        let word = word.as_ref();
        if word == "and" || word == "," {
            phrases.push(Vec::new());
        } else if let Some(last) = phrases.last_mut() {
            last.push(word.to_string());
        }
    }
    phrases.retain(|p| !p.is_empty());
    phrases
}

/// Reachable entities for a base, in traversal order.
fn base_set(base: ScopeBase, context: &GrammarContext<'_>) -> Vec<EntityId> {
    let world = context.world;
    let actor = context.actor;
    let mut out = Vec::new();

    match base {
        ScopeBase::All => return world.entities(),
        ScopeBase::Nearby => {
            if let Some(room) = context.location {
                out.extend(world.contents(room).into_iter().filter(|id| *id != actor));
            }
            return out;
        }
        ScopeBase::Carried => {
            descend(world, actor, &mut out, &|id| opens_inward(world, id));
            return out;
        }
        ScopeBase::Visible | ScopeBase::Touchable => {}
    }

    let reveals = |id| world.reveals_contents(id);
    let reachable = |id| opens_inward(world, id);
    let through: &dyn Fn(EntityId) -> bool = if base == ScopeBase::Visible {
        &reveals
    } else {
        &reachable
    };

    if let Some(room) = context.location {
        out.push(room);
        descend(world, room, &mut out, through);
    }
    push_unique(&mut out, actor);
    descend(world, actor, &mut out, through);
    out.retain(|id| *id != actor);
    out
}

/// Supporters and open containers can be reached into.
fn opens_inward(world: &dyn WorldModel, id: EntityId) -> bool {
    world.has_trait(id, &TraitType::Supporter)
        || (world.has_trait(id, &TraitType::Container) && world.is_open(id))
}

/// Pushes the contents of `parent`, recursing where `through` allows.
fn descend(
    world: &dyn WorldModel,
    parent: EntityId,
    out: &mut Vec<EntityId>,
    through: &dyn Fn(EntityId) -> bool,
) {
    for child in world.contents(parent) {
        if out.contains(&child) {
            continue;
        }
        out.push(child);
        if through(child) {
            descend(world, child, out, through);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pronouns::PronounState;
    use parley_world::{EntitySpec, Trait, World};

    struct Fixture {
        world: World,
        player: EntityId,
        room: EntityId,
        box_: EntityId,
        coin: EntityId,
        lamp: EntityId,
        key: EntityId,
        hall: EntityId,
    }

    fn fixture() -> Fixture {
        let mut world = World::new();
        let room = world
            .create_entity(EntitySpec::new("study").with_trait(Trait::room()), None)
            .unwrap();
        let hall = world
            .create_entity(EntitySpec::new("hall").with_trait(Trait::room()), None)
            .unwrap();
        let player = world
            .create_entity(
                EntitySpec::new("yourself").with_trait(Trait::Actor { is_player: true }),
                Some(room),
            )
            .unwrap();
        let box_ = world
            .create_entity(
                EntitySpec::new("box")
                    .with_trait(Trait::container())
                    .with_trait(Trait::openable(false)),
                Some(room),
            )
            .unwrap();
        let coin = world
            .create_entity(EntitySpec::new("gold coin"), Some(box_))
            .unwrap();
        let lamp = world
            .create_entity(EntitySpec::new("brass lamp").with_property("lit", true), Some(room))
            .unwrap();
        let key = world
            .create_entity(EntitySpec::new("key"), Some(player))
            .unwrap();
        Fixture {
            world,
            player,
            room,
            box_,
            coin,
            lamp,
            key,
            hall,
        }
    }

    fn words(text: &str) -> Vec<String> {
        text.split_whitespace().map(String::from).collect()
    }

    #[test]
    fn visible_excludes_closed_contents_and_actor() {
        let f = fixture();
        let ctx = GrammarContext::new(&f.world, f.player);
        let found = ScopeResolver::new().candidates(&ScopeConstraint::default(), &ctx);
        assert_eq!(found, vec![f.room, f.box_, f.lamp, f.key]);
    }

    #[test]
    fn open_container_reveals_contents() {
        let mut f = fixture();
        f.world.set_open(f.box_, true).unwrap();
        let ctx = GrammarContext::new(&f.world, f.player);
        let found = ScopeResolver::new().candidates(&ScopeConstraint::default(), &ctx);
        assert!(found.contains(&f.coin));
    }

    #[test]
    fn transparent_is_visible_but_not_touchable() {
        let mut f = fixture();
        f.world
            .add_trait(
                f.box_,
                Trait::Container {
                    capacity: None,
                    transparent: true,
                },
            )
            .unwrap();
        let ctx = GrammarContext::new(&f.world, f.player);
        let resolver = ScopeResolver::new();
        let visible = resolver.candidates(&ScopeConstraint::builder().visible().build(), &ctx);
        let touchable = resolver.candidates(&ScopeConstraint::builder().touchable().build(), &ctx);
        assert!(visible.contains(&f.coin));
        assert!(!touchable.contains(&f.coin));
    }

    #[test]
    fn carried_and_nearby_and_all() {
        let f = fixture();
        let ctx = GrammarContext::new(&f.world, f.player);
        let resolver = ScopeResolver::new();
        assert_eq!(
            resolver.candidates(&ScopeConstraint::builder().carried().build(), &ctx),
            vec![f.key]
        );
        assert_eq!(
            resolver.candidates(&ScopeConstraint::builder().nearby().build(), &ctx),
            vec![f.box_, f.lamp]
        );
        assert_eq!(
            resolver
                .candidates(&ScopeConstraint::builder().all().build(), &ctx)
                .len(),
            f.world.entity_count()
        );
    }

    #[test]
    fn filters_then_explicit_then_extensions() {
        let f = fixture();
        let ctx = GrammarContext::new(&f.world, f.player);
        let mut resolver = ScopeResolver::new();
        let hall = f.hall;
        resolver.register_extension("adjacent", move |_| vec![hall]);

        let constraint = ScopeConstraint::builder()
            .matching("lit", true)
            .also_include([f.coin])
            .include_rule("adjacent")
            .include_rule("missing")
            .build();
        assert_eq!(resolver.candidates(&constraint, &ctx), vec![f.lamp, f.coin, f.hall]);
    }

    #[test]
    fn boolean_property_can_test_traits() {
        let f = fixture();
        let ctx = GrammarContext::new(&f.world, f.player);
        let constraint = ScopeConstraint::builder().matching("container", true).build();
        assert_eq!(ScopeResolver::new().candidates(&constraint, &ctx), vec![f.box_]);
    }

    #[test]
    fn builder_build_is_a_snapshot() {
        let mut builder = ScopeConstraint::builder();
        builder.carried();
        let first = builder.build();
        builder.all().has_trait(TraitType::Container);
        assert_eq!(first.base, ScopeBase::Carried);
        assert!(first.filters.is_empty());
        assert_eq!(builder.build().filters.len(), 1);
    }

    #[test]
    fn resolve_unique_ambiguous_and_missing() {
        let mut f = fixture();
        let second = f
            .world
            .create_entity(EntitySpec::new("copper lamp"), Some(f.room))
            .unwrap();
        let ctx = GrammarContext::new(&f.world, f.player);
        let resolver = ScopeResolver::new();
        let scope = ScopeConstraint::default();

        assert_eq!(
            resolver.resolve_slot(&words("the brass lamp"), &scope, &ctx),
            SlotResolution::Unique(f.lamp)
        );
        assert_eq!(
            resolver.resolve_slot(&words("lamp"), &scope, &ctx),
            SlotResolution::Ambiguous {
                text: "lamp".into(),
                candidates: vec![f.lamp, second],
            }
        );
        assert_eq!(
            resolver.resolve_slot(&words("coin"), &scope, &ctx),
            SlotResolution::NotFound { text: "coin".into() }
        );
    }

    #[test]
    fn resolve_all_but() {
        let f = fixture();
        let ctx = GrammarContext::new(&f.world, f.player);
        let resolver = ScopeResolver::new();
        let scope = ScopeConstraint::default();

        let all = resolver.resolve_slot(&words("all"), &scope, &ctx);
        assert_eq!(all.entities(), vec![f.box_, f.lamp, f.key]);

        let but = resolver.resolve_slot(&words("all but the lamp and key"), &scope, &ctx);
        assert_eq!(
            but,
            SlotResolution::Multiple {
                entities: vec![f.box_],
                excluded: vec![f.lamp, f.key],
                is_all: true,
            }
        );
    }

    #[test]
    fn resolve_list() {
        let f = fixture();
        let ctx = GrammarContext::new(&f.world, f.player);
        let resolution =
            ScopeResolver::new().resolve_slot(&words("lamp and box"), &ScopeConstraint::default(), &ctx);
        assert_eq!(
            resolution,
            SlotResolution::Multiple {
                entities: vec![f.lamp, f.box_],
                excluded: Vec::new(),
                is_all: false,
            }
        );
    }

    #[test]
    fn resolve_comma_list() {
        let f = fixture();
        let ctx = GrammarContext::new(&f.world, f.player);
        let tokens = crate::tokenizer::Lexicon::english().tokenize("lamp, box, and key");
        let words: Vec<String> = tokens.into_iter().map(|t| t.normalized).collect();
        let resolution = ScopeResolver::new().resolve_slot(&words, &ScopeConstraint::default(), &ctx);
        assert_eq!(
            resolution,
            SlotResolution::Multiple {
                entities: vec![f.lamp, f.box_, f.key],
                excluded: Vec::new(),
                is_all: false,
            }
        );
    }

    #[test]
    fn resolve_pronoun_in_scope() {
        let f = fixture();
        let mut pronouns = PronounState::new();
        pronouns.set_it(f.lamp);
        let ctx = GrammarContext::new(&f.world, f.player).with_pronouns(&pronouns);
        let resolver = ScopeResolver::new();
        assert_eq!(
            resolver.resolve_slot(&words("it"), &ScopeConstraint::default(), &ctx),
            SlotResolution::Unique(f.lamp)
        );

        pronouns.set_it(f.coin);
        let ctx = GrammarContext::new(&f.world, f.player).with_pronouns(&pronouns);
        assert!(matches!(
            resolver.resolve_slot(&words("it"), &ScopeConstraint::default(), &ctx),
            SlotResolution::NotFound { .. }
        ));
    }
}
