//! Cycle detection: mappers that re-enter the engine on their own route
//! must fault instead of recursing forever.

use std::sync::Arc;

use typebridge::{Bridge, Mapper, MappingResult, Type};

#[derive(Debug, Clone, PartialEq)]
struct Celsius(f64);

#[derive(Debug, Clone, PartialEq)]
struct Fahrenheit(f64);

#[derive(Debug, Clone, PartialEq)]
struct Kelvin(f64);

#[test]
#[should_panic(expected = "cycling mapper invocation")]
fn self_recursive_mapper_panics() {
    let bridge = Arc::new(Bridge::builder().no_default_bundles().build());
    let inner = bridge.clone();
    bridge.register(
        Type::<Celsius>::of(),
        Type::<Fahrenheit>::of(),
        Mapper::uni(move |c: Celsius, _| {
            // Delegates to the engine for its own route.
            inner.convert(c, &Type::<Celsius>::of(), &Type::<Fahrenheit>::of()).into()
        }),
    );

    let _ = bridge.convert(Celsius(20.0), &Type::<Celsius>::of(), &Type::<Fahrenheit>::of());
}

#[test]
#[should_panic(expected = "cycling mapper invocation")]
fn indirect_cycle_across_two_mappers_panics() {
    let bridge = Arc::new(Bridge::builder().no_default_bundles().build());
    bridge.register(
        Type::<Celsius>::of(),
        Type::<Fahrenheit>::of(),
        Mapper::uni(|c: Celsius, _| MappingResult::Lossless(Fahrenheit(c.0 * 9.0 / 5.0 + 32.0))),
    );
    let inner = bridge.clone();
    bridge.register(
        Type::<Fahrenheit>::of(),
        Type::<Kelvin>::of(),
        Mapper::uni(move |f: Fahrenheit, _| {
            // Restarts the whole route from the beginning, which walks back
            // into this very mapper.
            let celsius = Celsius((f.0 - 32.0) * 5.0 / 9.0);
            inner.convert(celsius, &Type::<Celsius>::of(), &Type::<Kelvin>::of()).into()
        }),
    );

    let _ = bridge.convert(Celsius(20.0), &Type::<Celsius>::of(), &Type::<Kelvin>::of());
}

#[test]
fn nested_conversion_on_a_different_route_is_fine() {
    let bridge = Arc::new(Bridge::builder().no_default_bundles().build());
    bridge.register(
        Type::<f64>::of(),
        Type::<String>::of(),
        Mapper::uni(|v: f64, _| MappingResult::Lossless(v.to_string())),
    );
    let inner = bridge.clone();
    bridge.register(
        Type::<Celsius>::of(),
        Type::<String>::of(),
        Mapper::uni(move |c: Celsius, _| {
            match inner
                .convert(c.0, &Type::<f64>::of(), &Type::<String>::of())
                .into_result()
            {
                Ok(text) => MappingResult::Lossless(format!("{text}°C")),
                Err(error) => MappingResult::failure(error.message().to_owned()),
            }
        }),
    );

    let result =
        bridge.convert(Celsius(21.5), &Type::<Celsius>::of(), &Type::<String>::of());
    assert_eq!(result.value(), Some("21.5°C".to_owned()));
}

#[test]
fn cycle_detection_resets_after_a_failure() {
    let bridge = Arc::new(Bridge::builder().no_default_bundles().build());
    bridge.register(
        Type::<Celsius>::of(),
        Type::<Fahrenheit>::of(),
        Mapper::uni(|_: Celsius, _| MappingResult::failure("broken thermometer")),
    );

    // The stack entry of the failed call must not leak into later calls.
    for _ in 0..2 {
        let result =
            bridge.convert(Celsius(0.0), &Type::<Celsius>::of(), &Type::<Fahrenheit>::of());
        assert!(!result.is_success());
    }
}
