use std::time::Duration;

use instant::Instant;
use mist_warp::{
    data_structures::{
        clock::AnimationClock,
        params::{ParamUpdate, ParameterSet, ParameterStore},
        uniforms::{ShaderUniformSet, WarpUniform},
    },
    resources::texture::{Generation, LoadOutcome, TextureManager, TextureResource, TextureSource},
    sync::UniformSynchronizer,
};

use crate::common::test_utils::{bytes_source, loaded_manager, params, resolve_now, solid};

mod common;

#[test]
fn should_seed_uniforms_from_parameters() {
    let uniforms = ShaderUniformSet::new(&params(0.2, 0.03, 4.0));
    assert_eq!(
        uniforms.raw(),
        &WarpUniform {
            time: 0.0,
            speed: 0.2,
            distortion: 0.03,
            frequency: 4.0,
        }
    );
    assert_eq!(uniforms.texture(), None);
}

#[test]
fn should_pack_scalars_into_one_row() {
    assert_eq!(std::mem::size_of::<WarpUniform>(), 16);
}

#[test]
fn should_write_scalars_every_frame() {
    let mut store = ParameterStore::default();
    let mut uniforms = ShaderUniformSet::new(store.current());
    let mut sync = UniformSynchronizer::new();

    sync.on_frame(Some(&mut uniforms), 0.5, store.current(), None);
    assert_eq!(uniforms.time(), 0.5);
    assert_eq!(uniforms.speed(), 0.1);

    store.apply(ParamUpdate::Speed(0.9));
    store.apply(ParamUpdate::Distortion(0.3));
    store.apply(ParamUpdate::Frequency(7.5));
    sync.on_frame(Some(&mut uniforms), 0.6, store.current(), None);

    assert_eq!(uniforms.time(), 0.6);
    assert_eq!(uniforms.speed(), 0.9);
    assert_eq!(uniforms.distortion(), 0.3);
    assert_eq!(uniforms.frequency(), 7.5);
    assert_eq!(sync.frames(), 2);
}

#[test]
fn should_only_see_updates_from_the_next_frame() {
    let mut store = ParameterStore::default();
    let mut uniforms = ShaderUniformSet::new(store.current());
    let mut sync = UniformSynchronizer::new();

    sync.on_frame(Some(&mut uniforms), 0.1, store.current(), None);
    store.apply(ParamUpdate::Speed(0.5));
    assert_eq!(uniforms.speed(), 0.1);

    sync.on_frame(Some(&mut uniforms), 0.2, store.current(), None);
    assert_eq!(uniforms.speed(), 0.5);
}

#[test]
fn should_skip_frames_without_uniforms() {
    let mut sync = UniformSynchronizer::new();
    let texture = TextureResource::builtin();

    let bound = sync.on_frame(None, 1.0, &ParameterSet::default(), Some(texture.id()));

    assert_eq!(bound, None);
    assert_eq!(sync.frames(), 0);
}

#[test]
fn should_bind_texture_once() {
    let p = ParameterSet::default();
    let mut uniforms = ShaderUniformSet::new(&p);
    let mut sync = UniformSynchronizer::new();
    let first = TextureResource::builtin().id();
    let second = TextureResource::builtin().id();

    assert_eq!(sync.on_frame(Some(&mut uniforms), 0.0, &p, None), None);
    assert_eq!(uniforms.texture(), None);

    assert_eq!(sync.on_frame(Some(&mut uniforms), 0.1, &p, Some(first)), Some(first));
    assert_eq!(sync.on_frame(Some(&mut uniforms), 0.2, &p, Some(first)), None);
    assert_eq!(sync.on_frame(Some(&mut uniforms), 0.3, &p, Some(second)), None);
    assert_eq!(uniforms.texture(), Some(first));
}

#[test]
fn should_count_from_zero_on_start() {
    let start = Instant::now();
    let mut clock = AnimationClock::start_at(start);
    assert_eq!(clock.elapsed_at(start), 0.0);
    assert_eq!(clock.elapsed_at(start + Duration::from_millis(1500)), 1.5);
}

#[test]
fn should_never_run_backwards() {
    let start = Instant::now();
    let mut clock = AnimationClock::start_at(start);

    let later = clock.elapsed_at(start + Duration::from_secs(2));
    let earlier = clock.elapsed_at(start + Duration::from_secs(1));
    assert_eq!(later, 2.0);
    assert_eq!(earlier, 2.0);
}

#[test]
fn should_hold_at_zero_before_start() {
    let now = Instant::now();
    let mut clock = AnimationClock::start_at(now + Duration::from_secs(10));
    assert_eq!(clock.elapsed_at(now), 0.0);
}

#[test]
fn should_feed_monotonic_time_into_uniforms() {
    let start = Instant::now();
    let mut clock = AnimationClock::start_at(start);
    let p = ParameterSet::default();
    let mut uniforms = ShaderUniformSet::new(&p);
    let mut sync = UniformSynchronizer::new();

    let mut last = 0.0;
    for ms in [0, 16, 33, 20, 50, 49, 100] {
        let elapsed = clock.elapsed_at(start + Duration::from_millis(ms));
        sync.on_frame(Some(&mut uniforms), elapsed, &p, None);
        assert!(uniforms.time() >= last);
        last = uniforms.time();
    }
    assert_eq!(sync.frames(), 7);
}

#[test]
fn should_reference_only_the_new_generations_texture() {
    let p = ParameterSet::default();
    let old_manager = loaded_manager(Generation::FIRST, TextureSource::Default);
    let old_id = old_manager.current().unwrap().id();
    let mut old_uniforms = ShaderUniformSet::new(&p);
    UniformSynchronizer::new().on_frame(Some(&mut old_uniforms), 0.0, &p, Some(old_id));
    assert_eq!(old_uniforms.texture(), Some(old_id));

    // a load for the old generation is still in flight when it is torn down
    let pending = old_manager.ticket(TextureSource::Default);
    drop(old_uniforms);
    drop(old_manager);

    let mut manager = TextureManager::new(Generation::FIRST.next());
    let mut uniforms = ShaderUniformSet::new(&p);
    let mut sync = UniformSynchronizer::new();

    let outcome = manager.complete(&pending, Ok(TextureResource::builtin()));
    assert!(matches!(outcome, LoadOutcome::Stale));
    let available = manager.current().map(|resource| resource.id());
    sync.on_frame(Some(&mut uniforms), 0.1, &p, available);
    assert_eq!(uniforms.texture(), None);

    let source = bytes_source(&solid(2, 2, [0, 255, 0, 255]));
    let ticket = manager.ticket(source.clone());
    manager.complete(&ticket, Ok(resolve_now(source)));
    let new_id = manager.current().unwrap().id();
    let available = manager.current().map(|resource| resource.id());
    sync.on_frame(Some(&mut uniforms), 0.2, &p, available);

    assert_eq!(uniforms.texture(), Some(new_id));
    assert_ne!(new_id, old_id);
}
