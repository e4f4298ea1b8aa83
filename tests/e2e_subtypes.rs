//! End-to-end supertype widening: implicit upcasts during path discovery
//! and the strict-subtypes opt-out.

use pretty_assertions::assert_eq;
use typebridge::{
    Bridge, ConflictStrategy, ConversionResult, ErrorKind, Flag, Format, Mapper, MappingResult,
    Type,
};

#[derive(Debug, Clone, PartialEq)]
struct Tiger {
    name: String,
}

#[derive(Debug, Clone, PartialEq)]
struct Animal {
    name: String,
}

#[derive(Debug, Clone, PartialEq)]
struct LifeForm {
    name: String,
}

#[derive(Debug, Clone, PartialEq)]
struct Pet {
    name: String,
}

/// A bridge that knows `Tiger <: Animal <: LifeForm` and nothing else.
fn zoo_bridge() -> Bridge {
    let bridge = Bridge::builder().no_default_bundles().build();
    bridge.register_supertype::<Tiger, Animal>(|t| Animal { name: t.name });
    bridge.register_supertype::<Animal, LifeForm>(|a| LifeForm { name: a.name });
    bridge
}

#[test]
fn widening_alone_converts_to_a_declared_supertype() {
    let bridge = zoo_bridge();
    let tiger = Tiger { name: "shere khan".to_owned() };

    let result = bridge.convert(tiger, &Type::<Tiger>::of(), &Type::<Animal>::of());
    assert_eq!(
        result,
        ConversionResult::Success {
            value: Animal { name: "shere khan".to_owned() },
            lossless: true
        }
    );
}

#[test]
fn widening_chains_through_intermediate_supertypes() {
    let bridge = zoo_bridge();
    let tiger = Tiger { name: "hobbes".to_owned() };

    let result = bridge.convert(tiger, &Type::<Tiger>::of(), &Type::<LifeForm>::of());
    assert_eq!(
        result,
        ConversionResult::Success {
            value: LifeForm { name: "hobbes".to_owned() },
            lossless: true
        }
    );
}

#[test]
fn subtype_uses_mappers_registered_on_the_supertype() {
    let bridge = zoo_bridge();
    bridge.register(
        Type::<Animal>::of(),
        Type::<String>::of(),
        Mapper::uni(|a: Animal, _| MappingResult::Lossless(a.name)),
    );

    let tiger = Tiger { name: "rajah".to_owned() };
    let result = bridge.convert(tiger, &Type::<Tiger>::of(), &Type::<String>::of());
    assert_eq!(result, ConversionResult::Success { value: "rajah".to_owned(), lossless: true });
}

#[test]
fn explicit_mapper_beats_widening() {
    let bridge = zoo_bridge();
    bridge.register(
        Type::<Animal>::of(),
        Type::<String>::of(),
        Mapper::uni(|a: Animal, _| MappingResult::Lossless(a.name)),
    );
    bridge.register(
        Type::<Tiger>::of(),
        Type::<String>::of(),
        Mapper::uni(|t: Tiger, _| MappingResult::Lossless(format!("tiger {}", t.name))),
    );

    let tiger = Tiger { name: "richard".to_owned() };
    let result = bridge.convert(tiger, &Type::<Tiger>::of(), &Type::<String>::of());
    assert_eq!(
        result,
        ConversionResult::Success { value: "tiger richard".to_owned(), lossless: true }
    );
}

#[test]
fn strict_subtypes_flag_blocks_widened_sources() {
    let bridge = zoo_bridge();
    bridge.register_with(
        Type::<Animal>::of(),
        Type::<String>::of(),
        Mapper::uni(|a: Animal, _| MappingResult::Lossless(a.name)),
        ConflictStrategy::Fail,
        &[Flag::StrictSubTypes],
    );

    // The supertype itself still converts.
    let animal = Animal { name: "generic".to_owned() };
    assert!(bridge.convert(animal, &Type::<Animal>::of(), &Type::<String>::of()).is_success());

    // A tiger would only reach the mapper through widening, which the flag
    // forbids.
    assert!(!bridge.exists_path(&Type::<Tiger>::of(), &Type::<String>::of()));
    let tiger = Tiger { name: "sneaky".to_owned() };
    let result = bridge.convert(tiger, &Type::<Tiger>::of(), &Type::<String>::of());
    assert_eq!(result.error().map(|e| e.kind()), Some(ErrorKind::NoPathFound));
}

#[test]
fn strict_subtypes_flag_blocks_format_equivalence_hops() {
    let bridge = zoo_bridge();
    let tagged_animal = Type::<Animal>::tagged(Format::tag("beast"));
    let tagged_tiger = Type::<Tiger>::tagged(Format::tag("beast"));
    bridge.register_with(
        tagged_animal.clone(),
        Type::<String>::of(),
        Mapper::uni(|a: Animal, _| MappingResult::Lossless(a.name)),
        ConflictStrategy::Fail,
        &[Flag::StrictSubTypes],
    );

    // Reaching the mapper from the tagged tiger requires a container
    // conversion first; the head after that hop no longer is the type the
    // caller asked for, so the strict edge is off limits.
    assert!(!bridge.exists_path(&tagged_tiger, &Type::<String>::of()));

    // Without the flag the same route works end to end.
    let lenient = zoo_bridge();
    lenient.register(
        tagged_animal.clone(),
        Type::<String>::of(),
        Mapper::uni(|a: Animal, _| MappingResult::Lossless(a.name)),
    );
    let tiger = Tiger { name: "caspar".to_owned() };
    let result = lenient.convert(tiger, &tagged_tiger, &Type::<String>::of());
    assert_eq!(result, ConversionResult::Success { value: "caspar".to_owned(), lossless: true });
}

#[test]
fn widening_does_not_run_backwards() {
    let bridge = zoo_bridge();
    bridge.register(
        Type::<Tiger>::of(),
        Type::<String>::of(),
        Mapper::uni(|t: Tiger, _| MappingResult::Lossless(t.name)),
    );

    // An animal is not a tiger.
    assert!(!bridge.exists_path(&Type::<Animal>::of(), &Type::<String>::of()));
}

#[test]
fn widening_considers_every_declared_supertype() {
    let bridge = Bridge::builder().no_default_bundles().build();
    bridge.register_supertype::<Tiger, Animal>(|t| Animal { name: t.name });
    bridge.register_supertype::<Tiger, Pet>(|t| Pet { name: t.name });
    // The only usable mapper sits on the second declared supertype.
    bridge.register(
        Type::<Pet>::of(),
        Type::<String>::of(),
        Mapper::uni(|p: Pet, _| MappingResult::Lossless(format!("pet {}", p.name))),
    );

    let tiger = Tiger { name: "tom".to_owned() };
    let result = bridge.convert(tiger, &Type::<Tiger>::of(), &Type::<String>::of());
    assert_eq!(result, ConversionResult::Success { value: "pet tom".to_owned(), lossless: true });
}

#[test]
fn cyclic_supertype_declarations_terminate_the_search() {
    let bridge = Bridge::builder().no_default_bundles().build();
    bridge.register_supertype::<Tiger, Animal>(|t| Animal { name: t.name });
    bridge.register_supertype::<Animal, Tiger>(|a| Tiger { name: a.name });

    // Widening must not re-enqueue vertices the search already saw.
    assert!(!bridge.exists_path(&Type::<Tiger>::of(), &Type::<String>::of()));

    let tiger = Tiger { name: "ouroboros".to_owned() };
    let result = bridge.convert(tiger, &Type::<Tiger>::of(), &Type::<Animal>::of());
    assert_eq!(
        result,
        ConversionResult::Success {
            value: Animal { name: "ouroboros".to_owned() },
            lossless: true
        }
    );
}

#[test]
fn redeclaring_a_supertype_replaces_the_upcast() {
    let bridge = Bridge::builder().no_default_bundles().build();
    bridge.register_supertype::<Tiger, Animal>(|t| Animal { name: t.name });
    bridge.register_supertype::<Tiger, Animal>(|t| Animal { name: t.name.to_uppercase() });

    let tiger = Tiger { name: "louie".to_owned() };
    let result = bridge.convert(tiger, &Type::<Tiger>::of(), &Type::<Animal>::of());
    assert_eq!(
        result,
        ConversionResult::Success { value: Animal { name: "LOUIE".to_owned() }, lossless: true }
    );
}
