//! Behavior tests for symbol resolution.
//!
//! These verify HOW raw operator input turns into canonical identity:
//! decoration stripping, alias mapping, code lookup and sector fallback.

use windward_core::{SymbolRegistry, SECTOR_OTHER};

// =============================================================================
// Resolution: canonical forms
// =============================================================================

#[test]
fn when_a_known_name_is_resolved_it_gains_code_and_sector() {
    // Given: the built-in registry
    let registry = SymbolRegistry::default();

    // When: a canonical name is resolved
    let resolved = registry.resolve("台積電");

    // Then: identity is complete
    assert_eq!(resolved.code.as_ref().map(|c| c.as_str()), Some("2330"));
    assert_eq!(resolved.display_name, "台積電");
    assert_eq!(resolved.sector, "半導體");
}

#[test]
fn when_a_numeric_code_is_resolved_it_maps_back_to_the_display_name() {
    let registry = SymbolRegistry::default();

    let resolved = registry.resolve("2330");

    assert_eq!(resolved.display_name, "台積電");
    assert_eq!(resolved.code.as_ref().map(|c| c.as_str()), Some("2330"));
}

#[test]
fn when_an_alias_is_resolved_it_lands_on_the_canonical_symbol() {
    let registry = SymbolRegistry::default();

    assert_eq!(registry.resolve("台積").display_name, "台積電");
    assert_eq!(registry.resolve("大立光電").display_name, "大立光");
}

// =============================================================================
// Resolution: decorations and flags
// =============================================================================

#[test]
fn when_input_carries_decoration_markers_they_are_stripped_before_lookup() {
    let registry = SymbolRegistry::default();

    let resolved = registry.resolve("台積電(CB)");

    assert_eq!(resolved.display_name, "台積電");
    assert_eq!(resolved.code.as_ref().map(|c| c.as_str()), Some("2330"));
}

#[test]
fn when_input_carries_the_manual_override_flag_it_still_resolves() {
    let registry = SymbolRegistry::default();

    let resolved = registry.resolve("欣興電子!");

    assert_eq!(resolved.display_name, "欣興");
    assert!(resolved.code.is_some());
}

// =============================================================================
// Resolution: totality and fallbacks
// =============================================================================

#[test]
fn when_nothing_matches_resolution_still_yields_a_usable_identity() {
    // Given: a name the registry has never seen
    let registry = SymbolRegistry::default();

    // When: it is resolved
    let resolved = registry.resolve("完全陌生的名字");

    // Then: no code, cleaned name preserved, sentinel sector
    assert!(resolved.code.is_none());
    assert_eq!(resolved.display_name, "完全陌生的名字");
    assert_eq!(resolved.sector, SECTOR_OTHER);
}

#[test]
fn resolution_is_idempotent_over_its_own_display_name() {
    let registry = SymbolRegistry::default();

    let first = registry.resolve("台積電(CB)");
    let second = registry.resolve(&first.display_name);

    assert_eq!(first.display_name, second.display_name);
    assert_eq!(first.code, second.code);
    assert_eq!(first.sector, second.sector);
}

#[test]
fn sector_overrides_beat_the_registry_sector() {
    let registry = SymbolRegistry::default();

    // 緯穎 sits in the registry with its listed sector, but the
    // override table reclassifies it.
    assert_eq!(registry.resolve("緯穎").sector, "AI伺服器");
}

#[test]
fn every_resolution_reports_a_non_empty_sector() {
    let registry = SymbolRegistry::default();

    for raw in ["台積電", "2330", "台積", "沒有此股", "", "  "] {
        let resolved = registry.resolve(raw);
        assert!(
            !resolved.sector.is_empty(),
            "sector must never be empty for input {raw:?}"
        );
    }
}
