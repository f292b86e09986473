//! §4.6 "Facts envelope": the on-disk/on-wire form of one package's
//! [`InferredMap`], deterministically encoded and flate2-compressed so a
//! downstream package's build can import it cheaply.

use std::io::{Read, Write};

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use nilcheck_assert::Site;
use nilcheck_base::Interner;
use nilcheck_infer::InferredMap;

use crate::error::FactsError;
use crate::wire::{decode_site, decode_value, encode_site, encode_value, WireInferredMap};

/// §8 scenario 6 (stress test): a 3000-site/2000-edge map must encode under
/// this many bytes. Not enforced inside `encode_inferred_map` itself — a
/// pathological map is allowed to exceed it, it just won't be fast to
/// import — callers that care (the stress test, `nilcheck-core`'s
/// end-to-end budget check) call [`check_size_budget`] explicitly.
pub const FACTS_SIZE_LIMIT_BYTES: usize = 250 * 1024;

pub fn check_size_budget(bytes: &[u8]) -> Result<(), FactsError> {
    if bytes.len() > FACTS_SIZE_LIMIT_BYTES {
        return Err(FactsError::TooLarge {
            bytes: bytes.len(),
            limit: FACTS_SIZE_LIMIT_BYTES,
        });
    }
    Ok(())
}

/// Encodes `map` as a compressed byte envelope. Entries are written in the
/// map's own iteration order (§5's ordering guarantee), so two calls given
/// equal maps produce byte-identical output.
pub fn encode_inferred_map(map: &InferredMap, interner: &Interner) -> Result<Vec<u8>, FactsError> {
    let entries = map
        .iter()
        .map(|(site, value)| (encode_site(site, interner), encode_value(value, interner)))
        .collect();
    let wire = WireInferredMap { entries };

    let raw = bincode::serialize(&wire).map_err(FactsError::Encode)?;

    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&raw)?;
    let compressed = encoder.finish()?;

    log::debug!(
        "encoded facts envelope: {} sites, {} raw bytes, {} compressed bytes",
        wire.entries.len(),
        raw.len(),
        compressed.len()
    );

    Ok(compressed)
}

/// Decodes a byte envelope produced by [`encode_inferred_map`], interning
/// every resolved string through `interner` so the returned map's `Site`s
/// are comparable against ones already known to the caller's build.
pub fn decode_inferred_map(bytes: &[u8], interner: &mut Interner) -> Result<InferredMap, FactsError> {
    let mut decoder = GzDecoder::new(bytes);
    let mut raw = Vec::new();
    decoder.read_to_end(&mut raw)?;

    let wire: WireInferredMap = bincode::deserialize(&raw).map_err(FactsError::Decode)?;

    let mut map = InferredMap::new();
    for (wire_site, wire_value) in &wire.entries {
        let site: Site = decode_site(wire_site, interner);
        let value = decode_value(wire_value, interner).ok_or_else(|| FactsError::UnknownAnnotation {
            kind: "producer or consumer",
            name: wire_site.object_repr.clone(),
        })?;
        map.insert(site, value);
    }

    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nilcheck_assert::Site;
    use nilcheck_base::Position;
    use nilcheck_infer::{EdgeReason, ExplainedBool, Explanation, InferredValue, SiteEdges};
    use nilcheck_track::{ConsumerAnnotation, DeclId, ProducerAnnotation};

    fn site(interner: &mut Interner, path: &str, repr: &str, decl: u32, deep: bool) -> Site {
        Site::new(
            interner.intern(path),
            interner.intern(repr),
            DeclId(decl),
            deep,
            Position::new(decl, 1),
            true,
        )
    }

    #[test]
    fn round_trips_a_determined_and_an_undetermined_site() {
        let mut interner = Interner::new();
        let producer_site = site(&mut interner, "pkg/a", "Foo.field", 1, false);
        let consumer_site = site(&mut interner, "pkg/b", "Bar.param", 2, true);

        let mut map = InferredMap::new();
        map.insert(
            producer_site,
            InferredValue::Determined(ExplainedBool::new(true, Explanation::TrueBecauseShallowConstraint)),
        );
        let mut edges = SiteEdges::default();
        edges.implicants.insert(
            producer_site,
            EdgeReason {
                producer: ProducerAnnotation::FieldRead,
                consumer: ConsumerAnnotation::ArgPassDeep,
            },
        );
        map.insert(consumer_site, InferredValue::Undetermined(edges));

        let bytes = encode_inferred_map(&map, &interner).expect("encode");
        check_size_budget(&bytes).expect("within budget");

        let mut decode_interner = Interner::new();
        // Re-intern the same strings first so symbols line up across maps
        // in the way a real downstream build's interner would.
        decode_interner.intern("pkg/a");
        decode_interner.intern("Foo.field");
        decode_interner.intern("pkg/b");
        decode_interner.intern("Bar.param");

        let decoded = decode_inferred_map(&bytes, &mut decode_interner).expect("decode");
        assert_eq!(decoded.len(), 2);

        let decoded_producer_site = site(&mut decode_interner, "pkg/a", "Foo.field", 1, false);
        assert_eq!(decoded.get(&decoded_producer_site).and_then(|v| v.determined_value()), Some(true));

        let decoded_consumer_site = site(&mut decode_interner, "pkg/b", "Bar.param", 2, true);
        match decoded.get(&decoded_consumer_site) {
            Some(InferredValue::Undetermined(edges)) => {
                assert_eq!(edges.implicants.len(), 1);
                assert!(edges.implicants.contains_key(&decoded_producer_site));
            }
            other => panic!("expected undetermined site, got {other:?}"),
        }
    }

    #[test]
    fn encoding_is_deterministic() {
        let mut interner = Interner::new();
        let s = site(&mut interner, "pkg/a", "Foo.field", 1, false);
        let mut map = InferredMap::new();
        map.insert(
            s,
            InferredValue::Determined(ExplainedBool::new(false, Explanation::FalseBecauseShallowConstraint)),
        );

        let first = encode_inferred_map(&map, &interner).expect("encode");
        let second = encode_inferred_map(&map, &interner).expect("encode");
        assert_eq!(first, second);
    }

    #[test]
    fn empty_map_round_trips() {
        let interner = Interner::new();
        let map = InferredMap::new();
        let bytes = encode_inferred_map(&map, &interner).expect("encode");
        let mut decode_interner = Interner::new();
        let decoded = decode_inferred_map(&bytes, &mut decode_interner).expect("decode");
        assert!(decoded.is_empty());
    }
}
