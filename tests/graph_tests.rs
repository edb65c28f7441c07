//! Animation Graph Tests
//!
//! Tests for:
//! - End-to-end clip sampling and palette finalization
//! - Per-frame memoization of shared nodes
//! - ClipSampler time stepping, clip-switch reset, reverse playback
//! - Blend / AdditiveBlend / SelectPoseByBool node semantics and defaults
//! - Boolean and float operator nodes (including IEEE division by zero)
//! - Graph editing errors
//! - Cloning: independence and preserved sharing

use std::f32::consts::FRAC_PI_2;
use std::sync::Arc;

use glam::{Mat4, Quat, Vec3};

use sinew::animation::{
    AnimationClip, AnimationGraph, AnimationSettings, BoneInfo, BoneNode, BoneTrack, BoolOp,
    FloatOp, KeyframeTrack, NodeKey, NodeType, Skeleton, VariableValue, inputs,
};
use sinew::interner::intern;
use sinew::{SinewError, Transform};

const EPSILON: f32 = 1e-5;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

// ============================================================================
// Fixtures
// ============================================================================

/// root -> child, child bound one unit up.
fn skeleton() -> Arc<Skeleton> {
    let root = BoneNode::new("graph_root", Mat4::IDENTITY).with_child(BoneNode::new(
        "graph_child",
        Mat4::from_translation(Vec3::Y),
    ));
    let skeleton = Skeleton::new(
        root,
        [
            ("graph_root", BoneInfo::new(0, Mat4::IDENTITY)),
            ("graph_child", BoneInfo::new(1, Mat4::from_translation(-Vec3::Y))),
        ],
        Mat4::IDENTITY,
    )
    .unwrap();
    Arc::new(skeleton)
}

/// Child rotated 90 degrees about Z, one tick per second, ten ticks long.
/// Rotation only: translation and scale come from the bind pose.
fn rotate_clip() -> Arc<AnimationClip> {
    let track = BoneTrack::default()
        .with_rotations(KeyframeTrack::constant(Quat::from_rotation_z(FRAC_PI_2)));
    Arc::new(AnimationClip::new("rotate", 1.0, [("graph_child", track)]).with_duration(10.0))
}

/// Child slides from x = 0 to x = 10 over ten ticks at one tick per second.
fn slide_clip(name: &str) -> Arc<AnimationClip> {
    let track = BoneTrack::default().with_translations(KeyframeTrack::from_pairs(
        &[0.0, 10.0],
        &[Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0)],
    ));
    Arc::new(AnimationClip::new(name, 1.0, [("graph_child", track)]))
}

fn sampler(graph: &mut AnimationGraph, clip_variable: &str) -> NodeKey {
    let node = graph.add_node(NodeType::ClipSampler);
    graph
        .set_input_named(node, inputs::sampler::CLIP, clip_variable)
        .unwrap();
    node
}

fn child_translation(graph: &AnimationGraph) -> Vec3 {
    graph.output_pose().unwrap().get(intern("graph_child")).unwrap().translation
}

fn current_time(graph: &AnimationGraph, node: NodeKey) -> f32 {
    graph.node(node).unwrap().clip_sampler().unwrap().current_time
}

// ============================================================================
// End to end
// ============================================================================

#[test]
fn clip_sampler_end_to_end_palette() {
    init_logger();
    let mut graph = AnimationGraph::new(skeleton());
    graph.declare_variable("clip", rotate_clip()).unwrap();
    graph.declare_variable("speed", 1.0_f32).unwrap();
    graph.declare_variable("loop", true).unwrap();

    let node = sampler(&mut graph, "clip");
    graph.set_input_named(node, inputs::sampler::SPEED, "speed").unwrap();
    graph.set_input_named(node, inputs::sampler::LOOP, "loop").unwrap();
    graph.set_output(Some(node)).unwrap();

    let mut palette = Vec::new();
    graph.update(1.0, &mut palette);

    let pose = graph.output_pose().unwrap();
    assert_eq!(pose.len(), 1);
    assert!(!pose.contains(intern("graph_root")));
    let child = pose.get(intern("graph_child")).unwrap();
    assert!(child.translation.abs_diff_eq(Vec3::Y, EPSILON));
    assert!(child.scale.abs_diff_eq(Vec3::ONE, EPSILON));

    let expected_child = Mat4::from_translation(Vec3::Y)
        * Mat4::from_rotation_z(FRAC_PI_2)
        * Mat4::from_translation(-Vec3::Y);
    assert_eq!(palette.len(), 2);
    assert!(palette[0].abs_diff_eq(Mat4::IDENTITY, EPSILON));
    assert!(palette[1].abs_diff_eq(expected_child, EPSILON));
    assert_eq!(current_time(&graph, node), 1.0);
}

#[test]
fn graph_without_output_produces_bind_pose() {
    let mut graph = AnimationGraph::new(skeleton());
    assert!(graph.evaluate(0.1).is_none());

    let mut palette = Vec::new();
    graph.update(0.1, &mut palette);
    assert_eq!(graph.frame(), 2);
    assert_eq!(palette.len(), 2);
    assert!(palette.iter().all(|m| m.abs_diff_eq(Mat4::IDENTITY, EPSILON)));
}

#[test]
fn root_transform_setting_is_the_root_parent() {
    let settings = AnimationSettings {
        root_transform: Mat4::from_translation(Vec3::Z),
        ..Default::default()
    };
    let mut graph = AnimationGraph::with_settings(skeleton(), settings);

    let mut palette = Vec::new();
    graph.update(0.0, &mut palette);
    assert!(palette[0].abs_diff_eq(Mat4::from_translation(Vec3::Z), EPSILON));
}

// ============================================================================
// Memoization
// ============================================================================

#[test]
fn shared_node_is_computed_once_per_frame() {
    let mut graph = AnimationGraph::new(skeleton());
    graph.declare_variable("clip", slide_clip("slide")).unwrap();

    let shared = sampler(&mut graph, "clip");
    let left = graph.add_node(NodeType::Blend);
    let right = graph.add_node(NodeType::Blend);
    let top = graph.add_node(NodeType::Blend);
    for parent in [left, right] {
        graph.set_input_node(parent, inputs::blend::POSE_A, shared).unwrap();
        graph.set_input_node(parent, inputs::blend::POSE_B, shared).unwrap();
    }
    graph.set_input_node(top, inputs::blend::POSE_A, left).unwrap();
    graph.set_input_node(top, inputs::blend::POSE_B, right).unwrap();
    graph.set_output(Some(top)).unwrap();

    let mut palette = Vec::new();
    graph.update(1.0, &mut palette);
    assert_eq!(graph.node(shared).unwrap().evaluation_count(), 1);
    // Advanced once, not four times.
    assert_eq!(current_time(&graph, shared), 1.0);

    graph.update(1.0, &mut palette);
    let node = graph.node(shared).unwrap();
    assert_eq!(node.evaluation_count(), 2);
    assert_eq!(node.last_computed_frame(), graph.frame());
    assert_eq!(graph.node(top).unwrap().evaluation_count(), 2);
}

#[test]
fn shared_float_node_is_computed_once() {
    let mut graph = AnimationGraph::new(skeleton());
    let shared = graph.add_node(NodeType::Float(FloatOp::Cos));
    let sum = graph.add_node(NodeType::Float(FloatOp::Add));
    graph.set_input_node(sum, inputs::operator::LHS, shared).unwrap();
    graph.set_input_node(sum, inputs::operator::RHS, shared).unwrap();
    graph.set_output(Some(sum)).unwrap();

    graph.evaluate(0.1);
    assert_eq!(graph.node(shared).unwrap().evaluation_count(), 1);
    assert_eq!(graph.node(sum).unwrap().float_result(), 2.0);
}

// ============================================================================
// ClipSampler
// ============================================================================

#[test]
fn sampler_samples_then_advances() {
    let mut graph = AnimationGraph::new(skeleton());
    graph.declare_variable("clip", slide_clip("slide")).unwrap();
    let node = sampler(&mut graph, "clip");
    graph.set_output(Some(node)).unwrap();

    graph.evaluate(2.0);
    assert!(child_translation(&graph).abs_diff_eq(Vec3::ZERO, EPSILON));
    graph.evaluate(2.0);
    assert!(child_translation(&graph).abs_diff_eq(Vec3::new(2.0, 0.0, 0.0), EPSILON));
    assert_eq!(current_time(&graph, node), 4.0);
}

#[test]
fn sampler_speed_and_clamp() {
    let mut graph = AnimationGraph::new(skeleton());
    graph.declare_variable("clip", slide_clip("slide")).unwrap();
    let node = sampler(&mut graph, "clip");
    graph.set_input_value(node, inputs::sampler::SPEED, 3.0_f32).unwrap();
    graph.set_input_value(node, inputs::sampler::LOOP, false).unwrap();
    graph.set_output(Some(node)).unwrap();

    graph.evaluate(2.0);
    assert_eq!(current_time(&graph, node), 6.0);
    graph.evaluate(2.0);
    assert_eq!(current_time(&graph, node), 10.0);
    graph.evaluate(2.0);
    assert!(child_translation(&graph).abs_diff_eq(Vec3::new(10.0, 0.0, 0.0), EPSILON));
    assert_eq!(current_time(&graph, node), 10.0);
}

#[test]
fn sampler_reverse_playback_wraps_to_duration() {
    let mut graph = AnimationGraph::new(skeleton());
    graph.declare_variable("clip", slide_clip("slide")).unwrap();
    let node = sampler(&mut graph, "clip");
    graph.set_input_value(node, inputs::sampler::SPEED, -1.0_f32).unwrap();
    graph.set_output(Some(node)).unwrap();

    graph.evaluate(1.0);
    assert_eq!(current_time(&graph, node), 10.0);
    graph.evaluate(1.0);
    assert_eq!(current_time(&graph, node), 9.0);
}

#[test]
fn zero_rate_clip_uses_default_ticks_per_second() {
    let track = BoneTrack::default().with_translations(KeyframeTrack::from_pairs(
        &[0.0, 100.0],
        &[Vec3::ZERO, Vec3::X],
    ));
    let clip = Arc::new(AnimationClip::new("unrated", 0.0, [("graph_child", track)]));

    let mut graph = AnimationGraph::new(skeleton());
    graph.declare_variable("clip", clip).unwrap();
    let node = sampler(&mut graph, "clip");
    graph.set_output(Some(node)).unwrap();

    graph.evaluate(0.5);
    assert!((current_time(&graph, node) - 12.5).abs() < EPSILON);
}

#[test]
fn switching_clip_resets_time() {
    init_logger();
    let mut graph = AnimationGraph::new(skeleton());
    graph.declare_variable("clip", slide_clip("first")).unwrap();
    let node = sampler(&mut graph, "clip");
    graph.set_output(Some(node)).unwrap();

    graph.evaluate(3.0);
    graph.evaluate(3.0);
    assert_eq!(current_time(&graph, node), 6.0);

    graph.set_variable("clip", slide_clip("second")).unwrap();
    graph.evaluate(3.0);
    // Sampled from the start of the new clip, then advanced.
    assert!(child_translation(&graph).abs_diff_eq(Vec3::ZERO, EPSILON));
    assert_eq!(current_time(&graph, node), 3.0);
}

#[test]
fn stale_time_beyond_new_duration_is_rewound() {
    let mut graph = AnimationGraph::new(skeleton());
    graph.declare_variable("clip", slide_clip("slide")).unwrap();
    let node = sampler(&mut graph, "clip");
    graph.set_output(Some(node)).unwrap();
    graph.evaluate(0.0);

    graph
        .node_mut(node)
        .unwrap()
        .clip_sampler_mut()
        .unwrap()
        .current_time = 50.0;
    graph.evaluate(1.0);
    assert!(child_translation(&graph).abs_diff_eq(Vec3::ZERO, EPSILON));
}

#[test]
fn sampler_without_clip_yields_empty_pose() {
    let mut graph = AnimationGraph::new(skeleton());
    graph
        .declare_variable("clip", VariableValue::Animation(None))
        .unwrap();
    let node = sampler(&mut graph, "clip");
    graph.set_output(Some(node)).unwrap();

    assert!(graph.evaluate(1.0).unwrap().is_empty());
    assert_eq!(current_time(&graph, node), 0.0);
}

// ============================================================================
// Pose nodes
// ============================================================================

#[test]
fn blend_with_unbound_pose_is_empty() {
    let mut graph = AnimationGraph::new(skeleton());
    graph.declare_variable("clip", slide_clip("slide")).unwrap();
    let a = sampler(&mut graph, "clip");
    let blend = graph.add_node(NodeType::Blend);
    graph.set_input_node(blend, inputs::blend::POSE_A, a).unwrap();
    graph.set_input_value(blend, inputs::blend::WEIGHT, 0.5_f32).unwrap();
    graph.set_output(Some(blend)).unwrap();

    assert!(graph.evaluate(1.0).unwrap().is_empty());
}

#[test]
fn blend_weight_is_clamped() {
    let mut graph = AnimationGraph::new(skeleton());
    graph.declare_variable("clip", slide_clip("slide")).unwrap();
    let a = sampler(&mut graph, "clip");
    let b = sampler(&mut graph, "clip");
    graph.node_mut(b).unwrap().clip_sampler_mut().unwrap().current_time = 4.0;

    let blend = graph.add_node(NodeType::Blend);
    graph.set_input_node(blend, inputs::blend::POSE_A, a).unwrap();
    graph.set_input_node(blend, inputs::blend::POSE_B, b).unwrap();
    graph.declare_variable("weight", 7.0_f32).unwrap();
    graph.set_input_named(blend, inputs::blend::WEIGHT, "weight").unwrap();
    graph.set_output(Some(blend)).unwrap();

    graph.evaluate(0.0);
    // B was rewound by the clip switch on its first evaluation.
    assert!(child_translation(&graph).abs_diff_eq(Vec3::ZERO, EPSILON));

    graph.node_mut(b).unwrap().clip_sampler_mut().unwrap().current_time = 4.0;
    graph.evaluate(0.0);
    assert!(child_translation(&graph).abs_diff_eq(Vec3::new(4.0, 0.0, 0.0), EPSILON));

    graph.set_variable("weight", -3.0_f32).unwrap();
    graph.evaluate(0.0);
    assert!(child_translation(&graph).abs_diff_eq(Vec3::ZERO, EPSILON));
}

#[test]
fn additive_layer_through_the_graph() {
    let mut graph = AnimationGraph::new(skeleton());
    graph.declare_variable("base", slide_clip("base")).unwrap();
    graph.declare_variable("lean", rotate_clip()).unwrap();

    let base = sampler(&mut graph, "base");
    let reference = sampler(&mut graph, "base");
    let lean = sampler(&mut graph, "lean");

    let difference = graph.add_node(NodeType::CalculateAdditive);
    graph.set_input_node(difference, inputs::additive::REFERENCE, reference).unwrap();
    graph.set_input_node(difference, inputs::additive::SOURCE, lean).unwrap();

    let layer = graph.add_node(NodeType::AdditiveBlend);
    graph.set_input_node(layer, inputs::blend::POSE_A, base).unwrap();
    graph.set_input_node(layer, inputs::blend::POSE_B, difference).unwrap();
    graph.set_input_value(layer, inputs::blend::WEIGHT, 1.0_f32).unwrap();
    graph.set_output(Some(layer)).unwrap();

    // At time 0 the reference equals the base, so the layer yields the lean pose.
    graph.evaluate(0.0);
    let child = graph.output_pose().unwrap().get(intern("graph_child")).copied().unwrap();
    let expected = Transform::new(Vec3::Y, Quat::from_rotation_z(FRAC_PI_2), Vec3::ONE);
    assert!(child.abs_diff_eq(&expected, EPSILON));
}

#[test]
fn select_only_evaluates_chosen_branch() {
    let mut graph = AnimationGraph::new(skeleton());
    graph.declare_variable("slide", slide_clip("slide")).unwrap();
    graph.declare_variable("rotate", rotate_clip()).unwrap();
    graph.declare_variable("crouch", false).unwrap();

    let when_false = sampler(&mut graph, "slide");
    let when_true = sampler(&mut graph, "rotate");
    let select = graph.add_node(NodeType::SelectPoseByBool);
    graph.set_input_node(select, inputs::select::FALSE_POSE, when_false).unwrap();
    graph.set_input_node(select, inputs::select::TRUE_POSE, when_true).unwrap();
    graph.set_input_named(select, inputs::select::CONDITION, "crouch").unwrap();
    graph.set_output(Some(select)).unwrap();

    graph.evaluate(1.0);
    graph.evaluate(1.0);
    assert_eq!(graph.node(when_false).unwrap().evaluation_count(), 2);
    assert_eq!(graph.node(when_true).unwrap().evaluation_count(), 0);

    graph.set_variable("crouch", true).unwrap();
    graph.evaluate(1.0);
    assert_eq!(graph.node(when_true).unwrap().evaluation_count(), 1);
    // The deselected branch keeps its playback time.
    assert_eq!(current_time(&graph, when_false), 2.0);
    let rotation = graph.output_pose().unwrap().get(intern("graph_child")).unwrap().rotation;
    assert!(rotation.abs_diff_eq(Quat::from_rotation_z(FRAC_PI_2), EPSILON));
}

#[test]
fn select_condition_from_comparison_node() {
    let mut graph = AnimationGraph::new(skeleton());
    graph.declare_variable("slide", slide_clip("slide")).unwrap();
    graph.declare_variable("speed", 0.5_f32).unwrap();

    let moving = sampler(&mut graph, "slide");
    let compare = graph.add_node(NodeType::Bool(BoolOp::Greater));
    graph.set_input_named(compare, inputs::operator::LHS, "speed").unwrap();
    graph.set_input_value(compare, inputs::operator::RHS, 0.1_f32).unwrap();

    let select = graph.add_node(NodeType::SelectPoseByBool);
    graph.set_input_node(select, inputs::select::TRUE_POSE, moving).unwrap();
    graph.set_input_node(select, inputs::select::CONDITION, compare).unwrap();
    graph.set_output(Some(select)).unwrap();

    assert_eq!(graph.evaluate(1.0).unwrap().len(), 1);
    assert!(graph.node(compare).unwrap().bool_result());

    graph.set_variable("speed", 0.0_f32).unwrap();
    // False branch unbound: empty pose.
    assert!(graph.evaluate(1.0).unwrap().is_empty());
}

#[test]
fn mistyped_child_reads_default() {
    let mut graph = AnimationGraph::new(skeleton());
    graph.declare_variable("slide", slide_clip("slide")).unwrap();
    let pose = sampler(&mut graph, "slide");
    let number = graph.add_node(NodeType::Float(FloatOp::Cos));

    let select = graph.add_node(NodeType::SelectPoseByBool);
    graph.set_input_node(select, inputs::select::FALSE_POSE, pose).unwrap();
    // A float node feeding a boolean input is ignored.
    graph.set_input_node(select, inputs::select::CONDITION, number).unwrap();
    graph.set_output(Some(select)).unwrap();

    assert_eq!(graph.evaluate(1.0).unwrap().len(), 1);
    assert_eq!(graph.node(number).unwrap().evaluation_count(), 0);
}

// ============================================================================
// Operators
// ============================================================================

fn float_result(graph: &mut AnimationGraph, node: NodeKey) -> f32 {
    graph.set_output(Some(node)).unwrap();
    graph.evaluate(0.0);
    graph.node(node).unwrap().float_result()
}

#[test]
fn float_operator_chain() {
    let mut graph = AnimationGraph::new(skeleton());
    graph.declare_variable("degrees", 180.0_f32).unwrap();

    let radians = graph.add_node(NodeType::Float(FloatOp::ToRadians));
    graph.set_input_named(radians, inputs::operator::LHS, "degrees").unwrap();
    let half = graph.add_node(NodeType::Float(FloatOp::Mul));
    graph.set_input_node(half, inputs::operator::LHS, radians).unwrap();
    graph.set_input_value(half, inputs::operator::RHS, 0.5_f32).unwrap();
    let sin = graph.add_node(NodeType::Float(FloatOp::Sin));
    graph.set_input_node(sin, inputs::operator::LHS, half).unwrap();

    assert!((float_result(&mut graph, sin) - 1.0).abs() < EPSILON);
}

#[test]
fn division_by_zero_propagates_ieee_values() {
    let mut graph = AnimationGraph::new(skeleton());
    let div = graph.add_node(NodeType::Float(FloatOp::Div));
    graph.set_input_value(div, inputs::operator::LHS, 1.0_f32).unwrap();
    graph.set_input_value(div, inputs::operator::RHS, 0.0_f32).unwrap();
    assert_eq!(float_result(&mut graph, div), f32::INFINITY);

    let nan = graph.add_node(NodeType::Float(FloatOp::Div));
    assert!(float_result(&mut graph, nan).is_nan());
}

#[test]
fn boolean_logic_nodes() {
    let mut graph = AnimationGraph::new(skeleton());
    graph.declare_variable("a", true).unwrap();
    graph.declare_variable("b", false).unwrap();

    let xor = graph.add_node(NodeType::Bool(BoolOp::Xor));
    graph.set_input_named(xor, inputs::operator::LHS, "a").unwrap();
    graph.set_input_named(xor, inputs::operator::RHS, "b").unwrap();
    let not = graph.add_node(NodeType::Bool(BoolOp::Not));
    graph.set_input_node(not, inputs::operator::LHS, xor).unwrap();
    graph.set_output(Some(not)).unwrap();

    graph.evaluate(0.0);
    assert!(graph.node(xor).unwrap().bool_result());
    assert!(!graph.node(not).unwrap().bool_result());

    graph.set_variable("b", true).unwrap();
    graph.evaluate(0.0);
    assert!(graph.node(not).unwrap().bool_result());
}

// ============================================================================
// Editing
// ============================================================================

#[test]
fn editing_errors() {
    let mut graph = AnimationGraph::new(skeleton());
    let blend = graph.add_node(NodeType::Blend);

    assert!(matches!(
        graph.set_input_named(blend, 0, "missing"),
        Err(SinewError::UnknownVariable(name)) if name == "missing"
    ));
    assert!(matches!(
        graph.set_input_value(blend, 3, 1.0_f32),
        Err(SinewError::InputIndexOutOfRange { index: 3, arity: 3 })
    ));
    assert!(matches!(
        graph.set_input_node(blend, 0, blend),
        Err(SinewError::CycleDetected)
    ));

    graph.declare_variable("flag", true).unwrap();
    assert!(matches!(
        graph.set_variable("flag", 2.0_f32),
        Err(SinewError::VariableTypeMismatch { .. })
    ));
}

#[test]
fn rebinding_a_slot_replaces_previous_binding() {
    let mut graph = AnimationGraph::new(skeleton());
    let cos = graph.add_node(NodeType::Float(FloatOp::Cos));
    let sub = graph.add_node(NodeType::Float(FloatOp::Sub));
    graph.set_input_node(sub, inputs::operator::LHS, cos).unwrap();
    let local = graph.set_input_value(sub, inputs::operator::LHS, 5.0_f32).unwrap();

    let node = graph.node(sub).unwrap();
    assert_eq!(node.input(inputs::operator::LHS).variable(), Some(local));
    assert_eq!(node.input(inputs::operator::LHS).node(), None);

    graph.reset_inputs(sub).unwrap();
    assert!(graph.node(sub).unwrap().inputs().iter().all(|slot| !slot.is_bound()));
}

#[test]
fn reset_drops_nodes_output_and_variables() {
    let mut graph = AnimationGraph::new(skeleton());
    graph.declare_variable("clip", rotate_clip()).unwrap();
    let node = sampler(&mut graph, "clip");
    graph.set_output(Some(node)).unwrap();

    graph.reset();
    assert!(graph.output().is_none());
    assert!(graph.variables().is_empty());
    assert_eq!(graph.node_count(), 0);
    assert!(graph.node(node).is_none());
    assert!(matches!(graph.set_output(Some(node)), Err(SinewError::UnknownNode)));
    assert!(graph.evaluate(1.0).is_none());

    // Rebuilding after a reset starts from an empty arena.
    graph.declare_variable("clip", rotate_clip()).unwrap();
    let rebuilt = sampler(&mut graph, "clip");
    graph.set_output(Some(rebuilt)).unwrap();
    assert_eq!(graph.node_count(), 1);
    assert_eq!(graph.evaluate(1.0).map(|pose| pose.len()), Some(1));
}

// ============================================================================
// Cloning
// ============================================================================

#[test]
fn clone_has_independent_variables() {
    init_logger();
    let mut graph = AnimationGraph::new(skeleton());
    graph.declare_variable("speed", 1.0_f32).unwrap();
    let node = graph.add_node(NodeType::Float(FloatOp::Add));
    graph.set_input_named(node, inputs::operator::LHS, "speed").unwrap();
    graph.set_output(Some(node)).unwrap();

    let mut copy = graph.clone_graph();
    copy.set_variable("speed", 4.0_f32).unwrap();
    assert_eq!(graph.variable("speed").unwrap().value().as_float(), Some(1.0));

    graph.set_variable("speed", 2.0_f32).unwrap();
    assert_eq!(copy.variable("speed").unwrap().value().as_float(), Some(4.0));

    let output = copy.output().unwrap();
    assert_eq!(float_result(&mut copy, output), 4.0);
}

#[test]
fn clone_has_independent_playback_state() {
    init_logger();
    let mut graph = AnimationGraph::new(skeleton());
    graph.declare_variable("clip", slide_clip("slide")).unwrap();
    let node = sampler(&mut graph, "clip");
    graph.set_output(Some(node)).unwrap();
    graph.evaluate(3.0);

    let mut copy = graph.clone_graph();
    let copy_node = copy.output().unwrap();
    assert_eq!(current_time(&copy, copy_node), 3.0);
    assert_eq!(copy.frame(), graph.frame());

    copy.node_mut(copy_node).unwrap().clip_sampler_mut().unwrap().current_time = 7.0;
    assert_eq!(current_time(&graph, node), 3.0);

    graph.evaluate(1.0);
    assert_eq!(current_time(&graph, node), 4.0);
    assert_eq!(current_time(&copy, copy_node), 7.0);
}

#[test]
fn clone_preserves_variable_sharing() {
    init_logger();
    let mut graph = AnimationGraph::new(skeleton());
    graph.declare_variable("weight", 0.25_f32).unwrap();
    let a = graph.add_node(NodeType::Float(FloatOp::Sin));
    let b = graph.add_node(NodeType::Float(FloatOp::Cos));
    graph.set_input_named(a, inputs::operator::LHS, "weight").unwrap();
    graph.set_input_named(b, inputs::operator::LHS, "weight").unwrap();
    let sum = graph.add_node(NodeType::Float(FloatOp::Add));
    graph.set_input_node(sum, inputs::operator::LHS, a).unwrap();
    graph.set_input_node(sum, inputs::operator::RHS, b).unwrap();
    graph.set_output(Some(sum)).unwrap();

    let copy = graph.clone_graph();
    let root = copy.node(copy.output().unwrap()).unwrap();
    let left = copy.node(root.input(0).node().unwrap()).unwrap();
    let right = copy.node(root.input(1).node().unwrap()).unwrap();
    assert_eq!(left.input(0).variable(), right.input(0).variable());
    assert_eq!(left.input(0).variable(), copy.variables().key("weight"));
}

#[test]
fn clone_with_variables_binds_by_name() {
    init_logger();
    let mut graph = AnimationGraph::new(skeleton());
    graph.declare_variable("speed", 1.0_f32).unwrap();
    let node = graph.add_node(NodeType::Float(FloatOp::Mul));
    graph.set_input_named(node, inputs::operator::LHS, "speed").unwrap();
    graph.set_input_value(node, inputs::operator::RHS, 2.0_f32).unwrap();
    graph.set_output(Some(node)).unwrap();

    let mut table = sinew::VariableTable::new();
    table.declare("speed", 10.0_f32).unwrap();
    let mut copy = graph.clone_with_variables(table);
    let output = copy.output().unwrap();

    assert_eq!(float_result(&mut copy, output), 20.0);
    // The named variable was reused, the literal copied.
    assert_eq!(copy.variables().len(), 2);
}

#[test]
fn cloning_graph_without_output() {
    let mut graph = AnimationGraph::new(skeleton());
    graph.add_node(NodeType::Blend);
    let copy = graph.clone_graph();
    assert!(copy.output().is_none());
    assert_eq!(copy.node_count(), 0);
}
