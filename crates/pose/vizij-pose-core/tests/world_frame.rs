use std::sync::Arc;

use vizij_pose_core::{
    BonePose, BoneTrack, ClipRef, ClipSampler, InstanceCfg, InstanceId, Key, KeyframeClip,
    PoseClip, PoseConfig, PoseError, PoseWorld, Quat, RootDelta, SkeletonAssetId, Vec3,
    WorldTransform,
};

/// Two-bone clip: root walks 10 units along +x and yaws, bone 1 lifts along +y.
fn walk_clip() -> ClipRef {
    Arc::new(
        KeyframeClip::new(
            "walk",
            2000,
            2,
            vec![
                BoneTrack {
                    bone: 0,
                    translation: vec![
                        Key { stamp: 0.0, value: Vec3::ZERO },
                        Key { stamp: 1.0, value: Vec3::new(10.0, 0.0, 0.0) },
                    ],
                    rotation: vec![
                        Key { stamp: 0.0, value: Quat::IDENTITY },
                        Key { stamp: 1.0, value: Quat::from_rotation_y(0.8) },
                    ],
                    ..Default::default()
                },
                BoneTrack {
                    bone: 1,
                    translation: vec![
                        Key { stamp: 0.0, value: Vec3::new(0.0, 1.0, 0.0) },
                        Key { stamp: 1.0, value: Vec3::new(0.0, 2.0, 0.0) },
                    ],
                    ..Default::default()
                },
            ],
        )
        .unwrap(),
    )
}

fn world_with_everything(cfg: PoseConfig) -> (PoseWorld, InstanceId, InstanceId) {
    let mut world = PoseWorld::new(cfg);
    let hierarchy = world
        .hierarchy(SkeletonAssetId(1), || vec![None, Some(0)])
        .unwrap();
    let buffered = world.add_buffered_instance(hierarchy, InstanceCfg::default());
    let flat_owner = world.add_instance(InstanceCfg {
        apply_root_motion: false,
        ..Default::default()
    });
    world.add_bone(flat_owner, 0, BonePose::IDENTITY).unwrap();
    world.add_bone(flat_owner, 1, BonePose::IDENTITY).unwrap();
    world
        .add_dependent(buffered, WorldTransform::default())
        .unwrap();
    world
        .add_dependent(flat_owner, WorldTransform::default())
        .unwrap();

    let clip = walk_clip();
    for id in [buffered, flat_owner] {
        world
            .set_samplers(
                id,
                vec![ClipSampler::new(clip.clone(), 1.0, 0.5).with_previous_time(0.25)],
            )
            .unwrap();
    }
    (world, buffered, flat_owner)
}

/// it should run every stage and move instances and dependents by the root delta
#[test]
fn full_frame_poses_and_moves() {
    let (mut world, buffered, flat_owner) = world_with_everything(PoseConfig::default());
    let stats = world.run_frame();
    assert_eq!(stats.instances, 2);
    assert_eq!(stats.buffered_instances_posed, 1);
    assert_eq!(stats.flat_bones_posed, 2);
    assert_eq!(stats.root_motion_applied, 1);
    assert_eq!(stats.dependents_moved, 2);

    let clip = walk_clip();
    let inst = world.instance(buffered).unwrap();
    let buffer = inst.bone_to_root().unwrap();
    assert_eq!(buffer[0], clip.sample_bone(0, 0.5));
    assert_eq!(buffer[1], clip.sample_bone(0, 0.5).mul_pose(&clip.sample_bone(1, 0.5)));

    // root went from x=2.5 to x=5.0
    assert!(inst
        .root_delta
        .translation
        .abs_diff_eq(Vec3::new(2.5, 0.0, 0.0), 1e-5));
    assert!(inst.world.translation.abs_diff_eq(Vec3::new(2.5, 0.0, 0.0), 1e-5));

    let owner = world.instance(flat_owner).unwrap();
    assert_eq!(owner.world, WorldTransform::default());
    assert_eq!(owner.root_delta, inst.root_delta);

    let bone = world.bone(vizij_pose_core::BoneId(1)).unwrap();
    assert_eq!(bone.pose, clip.sample_bone(1, 0.5));
}

/// it should give each dependent exactly the delta its source computed
#[test]
fn dependents_receive_source_delta() {
    let (mut world, buffered, _) = world_with_everything(PoseConfig::default());
    world.run_frame();
    let delta = world.instance(buffered).unwrap().root_delta;
    let dep = world.dependent(vizij_pose_core::DependentId(0)).unwrap();
    assert_eq!(dep.source, buffered);

    let mut expected = WorldTransform::default();
    expected.apply_root_delta(&delta);
    assert_eq!(dep.world, expected);
}

/// it should keep world transforms still across a loop wrap
#[test]
fn loop_wrap_frame_does_not_teleport() {
    let (mut world, buffered, _) = world_with_everything(PoseConfig::default());
    world.run_frame();
    let before = world.instance(buffered).unwrap().world;

    let samplers = world.samplers_mut(buffered).unwrap();
    samplers[0].previous_normalized_time = 0.97;
    samplers[0].normalized_time = 0.03;
    world.run_frame();

    let inst = world.instance(buffered).unwrap();
    assert_eq!(inst.root_delta, RootDelta::ZERO);
    assert_eq!(inst.world, before);
    // the pose itself still follows the wrapped time
    assert_eq!(inst.bone_to_root().unwrap()[0], walk_clip().sample_bone(0, 0.03));
}

/// it should advance sampler time and rotate the previous time slot
#[test]
fn advance_steps_every_sampler() {
    let (mut world, buffered, _) = world_with_everything(PoseConfig::default());
    world.advance(0.5);
    let s = &world.instance(buffered).unwrap().samplers[0];
    assert_eq!(s.previous_normalized_time, 0.5);
    assert!((s.normalized_time - 0.75).abs() < 1e-6);
}

/// it should produce identical results regardless of batch size
#[cfg(feature = "parallel")]
#[test]
fn batch_size_does_not_change_results() {
    let small = PoseConfig {
        min_batch_len: 1,
        ..Default::default()
    };
    let large = PoseConfig {
        min_batch_len: 4096,
        ..Default::default()
    };
    let (mut a, id, _) = world_with_everything(small);
    let (mut b, _, _) = world_with_everything(large);
    a.run_frame();
    b.run_frame();
    let (ia, ib) = (a.instance(id).unwrap(), b.instance(id).unwrap());
    assert_eq!(ia.bone_to_root(), ib.bone_to_root());
    assert_eq!(ia.world, ib.world);
}

/// it should reject back-references to instances that do not exist
#[test]
fn registration_checks_references() {
    let mut world = PoseWorld::default();
    assert!(matches!(
        world.add_bone(InstanceId(3), 0, BonePose::IDENTITY),
        Err(PoseError::UnknownInstance(InstanceId(3)))
    ));
    assert!(matches!(
        world.add_dependent(InstanceId(0), WorldTransform::default()),
        Err(PoseError::UnknownInstance(_))
    ));
    assert!(world.set_samplers(InstanceId(0), Vec::new()).is_err());

    let hierarchy = world
        .hierarchy(SkeletonAssetId(9), || vec![None, Some(0), Some(0)])
        .unwrap();
    assert!(matches!(
        world.add_buffered_instance_with_poses(
            hierarchy,
            vec![BonePose::IDENTITY; 2],
            InstanceCfg::default()
        ),
        Err(PoseError::BufferSizeMismatch { expected: 3, actual: 2 })
    ));
}

/// it should leave an instance without samplers exactly where it was
#[test]
fn idle_instance_stays_put() {
    let mut world = PoseWorld::default();
    let hierarchy = world
        .hierarchy(SkeletonAssetId(2), || vec![None, Some(0)])
        .unwrap();
    let posed = vec![
        BonePose::from_translation_rotation(Vec3::X, Quat::IDENTITY),
        BonePose::from_translation_rotation(Vec3::Y, Quat::from_rotation_z(0.3)),
    ];
    let id = world
        .add_buffered_instance_with_poses(hierarchy, posed.clone(), InstanceCfg::default())
        .unwrap();
    let stats = world.run_frame();
    assert_eq!(stats.buffered_instances_posed, 0);
    let inst = world.instance(id).unwrap();
    assert_eq!(inst.bone_to_root().unwrap(), posed.as_slice());
    assert_eq!(inst.root_delta, RootDelta::ZERO);
    assert_eq!(inst.world, WorldTransform::default());
}
