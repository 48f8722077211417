// tests/generate.rs
use lsys_tree::{
    BERRY_COLOR, DigitStream, Error, GenerationParams, Generator, MAX_PRECISION, Mesh,
    MeshFragment, Species, generate, mesh_to_obj, write_obj,
};
use std::str::FromStr;

fn small_bush() -> GenerationParams {
    GenerationParams {
        iterations: 5,
        precision: 2000,
        ..Species::BerryBush.defaults()
    }
}

fn small_tree() -> GenerationParams {
    GenerationParams {
        iterations: 6,
        sections: 12,
        precision: 2000,
        ..Species::Tree.defaults()
    }
}

fn expect_invalid(params: &GenerationParams, field: &str) {
    match params.validate() {
        Err(Error::InvalidParameter { name, .. }) => assert_eq!(name, field),
        other => panic!("expected `{field}` to be rejected, got {other:?}"),
    }
}

// --- Parameters ---

#[test]
fn test_species_defaults_are_valid() {
    for &species in Species::ALL {
        let params = species.defaults();
        assert_eq!(params.species, species);
        params.validate().unwrap();
    }
    assert_eq!(GenerationParams::default(), Species::Tree.defaults());
}

#[test]
fn test_species_names() {
    assert_eq!(Species::from_str("berry-bush").unwrap(), Species::BerryBush);
    assert_eq!(Species::from_str("TREE").unwrap(), Species::Tree);
    assert!(Species::from_str("fern").is_err());
    assert_eq!(Species::BerryBush.to_string(), "berry-bush");
}

#[test]
fn test_validation_rejects_out_of_range() {
    let tree = Species::Tree.defaults();
    expect_invalid(&GenerationParams { seed: 0, ..tree.clone() }, "seed");
    expect_invalid(&GenerationParams { length: 15.0, ..tree.clone() }, "length");
    expect_invalid(&GenerationParams { taper: 0.85, ..tree.clone() }, "taper");
    expect_invalid(&GenerationParams { sections: 8, ..tree.clone() }, "sections");
    expect_invalid(&GenerationParams { iterations: 12, ..tree.clone() }, "iterations");
    expect_invalid(&GenerationParams { angle_deg: 31.0, ..tree.clone() }, "angle_deg");
    expect_invalid(
        &GenerationParams { angle_variation: 45.0, ..tree.clone() },
        "angle_variation",
    );
    expect_invalid(
        &GenerationParams { branch_deletion_chance: 1.5, ..tree.clone() },
        "branch_deletion_chance",
    );
    expect_invalid(&GenerationParams { precision: 0, ..tree }, "precision");

    let bush = Species::BerryBush.defaults();
    expect_invalid(&GenerationParams { berry_radius: 0.0, ..bush.clone() }, "berry_radius");
    expect_invalid(&GenerationParams { initial_radius: 1.0, ..bush.clone() }, "initial_radius");
    expect_invalid(&GenerationParams { iterations: 4, ..bush.clone() }, "iterations");
    GenerationParams { iterations: 12, taper: 1.0, ..bush }
        .validate()
        .unwrap();
}

#[test]
fn test_invalid_params_stop_generation() {
    let params = GenerationParams { seed: -3, ..small_bush() };
    assert!(matches!(generate(&params), Err(Error::InvalidParameter { name: "seed", .. })));
}

#[test]
fn test_json_merges_over_species_defaults() {
    let params =
        GenerationParams::from_json_str(r#"{ "species": "berry-bush", "seed": 42, "taper": 0.9 }"#)
            .unwrap();
    assert_eq!(params.species, Species::BerryBush);
    assert_eq!(params.seed, 42);
    assert_eq!(params.taper, 0.9);
    assert_eq!(params.length, Species::BerryBush.defaults().length);

    let params = GenerationParams::from_json_str("{}").unwrap();
    assert_eq!(params, Species::Tree.defaults());
}

#[test]
fn test_json_errors() {
    assert!(matches!(
        GenerationParams::from_json_str(r#"{ "species": "fern" }"#),
        Err(Error::Json(_))
    ));
    assert!(matches!(
        GenerationParams::from_json_str(r#"{ "seed": "many" }"#),
        Err(Error::Json(_))
    ));
    for not_an_object in ["[1, 2, 3]", "42", "\"tree\"", "null"] {
        assert!(
            matches!(GenerationParams::from_json_str(not_an_object), Err(Error::Json(_))),
            "{not_an_object} accepted"
        );
    }
    assert!(matches!(
        GenerationParams::from_json_file("/definitely/not/here.json"),
        Err(Error::Io(_))
    ));
}

#[test]
fn test_explicit_species_picks_defaults_for_json() {
    let params = GenerationParams::from_json_str_for(r#"{ "seed": 5 }"#, Species::BerryBush)
        .unwrap();
    assert_eq!(
        params,
        GenerationParams {
            seed: 5,
            ..Species::BerryBush.defaults()
        }
    );
    params.validate().unwrap();

    // The explicit species also wins over the one in the object.
    let json = r#"{ "species": "tree", "length": 4.0 }"#;
    let params = GenerationParams::from_json_str_for(json, Species::BerryBush).unwrap();
    assert_eq!(params.species, Species::BerryBush);
    assert_eq!(params.length, 4.0);
    assert_eq!(params.initial_radius, Species::BerryBush.defaults().initial_radius);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("seed.json");
    std::fs::write(&path, r#"{ "seed": 7 }"#).unwrap();
    let params = GenerationParams::from_json_file_for(&path, Species::BerryBush).unwrap();
    assert_eq!(params.length, Species::BerryBush.defaults().length);
    assert_eq!(params.seed, 7);
}

#[test]
fn test_precision_is_capped() {
    let tree = Species::Tree.defaults();
    GenerationParams { precision: MAX_PRECISION, ..tree.clone() }
        .validate()
        .unwrap();
    expect_invalid(
        &GenerationParams { precision: MAX_PRECISION + 1, ..tree.clone() },
        "precision",
    );
    expect_invalid(&GenerationParams { precision: 1_000_000, ..tree }, "precision");
}

#[test]
fn test_json_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bush.json");
    let params = small_bush();
    std::fs::write(&path, serde_json::to_string_pretty(&params).unwrap()).unwrap();
    assert_eq!(GenerationParams::from_json_file(&path).unwrap(), params);
}

// --- Generation ---

#[test]
fn test_berry_bush_end_to_end() {
    let params = small_bush();
    let stream = DigitStream::pi(params.precision);
    let grown = Generator::from_params(&params).generate(&stream).unwrap();

    assert!(grown.segments > 0);
    assert!(grown.leaves > 0);
    assert!(grown.berries > 0);
    assert_eq!(grown.branches, 0);
    assert_eq!(grown.berries, grown.lsystem.count('K'));

    let mesh = grown.mesh;
    assert!(mesh.validate());
    let colors = mesh.colors.as_ref().unwrap();
    assert!(colors.contains(&BERRY_COLOR));

    // Growth starts at the origin and heads up.
    let (lo, hi) = mesh.bounds().unwrap();
    assert!(lo.z < 0.5 && hi.z > params.length);
}

#[test]
fn test_generation_is_deterministic() {
    // The bush defaults neither prune nor jitter, so give the seed pruning to decide.
    let params = GenerationParams {
        branch_deletion_chance: 0.3,
        ..small_bush()
    };
    let a = generate(&params).unwrap();
    let b = generate(&params).unwrap();
    assert_eq!(a, b);

    let other = generate(&GenerationParams { seed: 1234, ..params }).unwrap();
    assert_ne!(a, other);
}

#[test]
fn test_fully_pruned_tree_is_a_trunk() {
    let params = GenerationParams {
        branch_deletion_chance: 1.0,
        ..small_tree()
    };
    let stream = DigitStream::pi(params.precision);
    let grown = Generator::from_params(&params).generate(&stream).unwrap();

    // Five trunk segments from S, three more per generation of L.
    assert_eq!(grown.segments, 5 + 3 * 5);
    assert_eq!(grown.branches, 0);
    assert_eq!(grown.leaves, 0);
    assert_eq!(grown.mesh.vertex_count(), grown.segments * (2 * 12 + 2));
    assert!(grown.mesh.validate());
}

#[test]
fn test_tree_grows_leafy_branches() {
    let params = GenerationParams {
        branch_deletion_chance: 0.0,
        ..small_tree()
    };
    let stream = DigitStream::pi(params.precision);
    let grown = Generator::from_params(&params).generate(&stream).unwrap();

    assert_eq!(grown.branches, grown.lsystem.count('f'));
    assert!(grown.branches > 0);
    assert!(grown.leaves > 0);
    assert!(grown.mesh.validate());
}

// --- Export ---

#[test]
fn test_obj_text() {
    let (frustum, _) =
        lsys_tree::build_frustum(glam::Vec3::ZERO, bevy_math::Dir3::Z, 1.0, 1.0, 1.0, 3);
    let mesh = Mesh::concatenate([frustum]);
    let obj = mesh_to_obj(&mesh, "segment");

    assert!(obj.starts_with("o segment\n"));
    assert_eq!(obj.lines().filter(|l| l.starts_with("v ")).count(), 8);
    assert_eq!(obj.lines().filter(|l| l.starts_with("vt ")).count(), 8);
    assert_eq!(obj.lines().filter(|l| l.starts_with("f ")).count(), 12);
    assert!(obj.contains("\nf 1/1 2/2 4/4\n"), "indices are 1-based");
}

#[test]
fn test_obj_vertex_colors() {
    let fragment = MeshFragment::new(
        vec![glam::Vec3::ZERO, glam::Vec3::X, glam::Vec3::Y],
        vec![[0, 1, 2]],
    )
    .with_color(BERRY_COLOR);
    let obj = mesh_to_obj(&Mesh::concatenate([fragment]), "berry");
    assert!(obj.contains("\nv 1 0 0 1 0 0\n"));
    assert!(obj.contains("\nf 1 2 3\n"));
}

#[test]
fn test_write_obj() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bush.obj");
    let mesh = generate(&small_bush()).unwrap();

    write_obj(&mesh, &path).unwrap();
    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains("o bush\n"));
    assert_eq!(
        text.lines().filter(|l| l.starts_with("f ")).count(),
        mesh.face_count()
    );
}

#[test]
fn test_write_empty_mesh_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.obj");
    assert!(matches!(write_obj(&Mesh::empty(), &path), Err(Error::EmptyMesh)));
    assert!(!path.exists());
}
