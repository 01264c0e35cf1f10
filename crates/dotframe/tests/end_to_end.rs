use dotframe::detect::synthetic::{apply_motion, clutter_dots, frame_dots, SyntheticFrame};
use dotframe::{
    DetectedBy, DetectorParams, Dot, DotFrameDetector, DotFrameSession, Frame, Homography,
};
use nalgebra::{Point2, Vector2};

fn detector() -> DotFrameDetector {
    let mut params = DetectorParams::default();
    params.tracker.seed = Some(2024);
    DotFrameDetector::new(params).expect("valid params")
}

fn at(x: f32, y: f32) -> SyntheticFrame {
    SyntheticFrame {
        origin: Point2::new(x, y),
        ..SyntheticFrame::default()
    }
}

fn scene(markers: &[(u32, SyntheticFrame)]) -> Vec<Dot> {
    markers
        .iter()
        .flat_map(|(code, layout)| frame_dots(*code, layout).expect("code in range"))
        .collect()
}

fn codes(frames: &[Frame]) -> Vec<u32> {
    let mut out: Vec<u32> = frames.iter().filter_map(|f| f.code).collect();
    out.sort_unstable();
    out
}

#[test]
fn code_42_from_raw_dots() {
    let frames = detector().detect(&scene(&[(42, SyntheticFrame::default())]), 8);
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].code, Some(42));
    assert_eq!(frames[0].detected_by, DetectedBy::Scratch);
}

#[test]
fn several_markers_in_shuffled_input() {
    let mut dots = scene(&[
        (7, at(50.0, 50.0)),
        (1_234_567, at(300.0, 60.0)),
        (999, at(120.0, 400.0)),
    ]);
    dots.reverse();
    dots.swap(3, 41);

    let frames = detector().detect(&dots, 8);
    assert_eq!(codes(&frames), vec![7, 999, 1_234_567]);
    assert!(frames.iter().all(|f| f.detected_by == DetectedBy::Scratch));
}

#[test]
fn rotated_and_scaled_markers() {
    for (angle, side, spacing) in [(0.3f32, 70.0f32, 10.0f32), (2.2, 110.0, 14.0), (-1.1, 60.0, 9.0)] {
        let layout = SyntheticFrame {
            angle,
            side,
            dot_spacing: spacing,
            dot_radius: 0.3 * spacing,
            ..at(200.0, 200.0)
        };
        let frames = detector().detect(&scene(&[(31_337, layout.clone())]), 8);
        assert_eq!(codes(&frames), vec![31_337], "layout {layout:?}");

        // Rotated to decode order: wedge 0 is the checksum wedge.
        let corners = frames[0].corners();
        assert!((corners[0] - layout.corners()[0]).norm() < 1e-3);
    }
}

#[test]
fn clutter_does_not_hide_the_marker() {
    let mut dots = scene(&[(42, at(100.0, 100.0))]);
    dots.extend(clutter_dots(
        60,
        Point2::new(300.0, 0.0),
        Point2::new(800.0, 600.0),
        25.0,
        9,
    ));
    let frames = detector().detect(&dots, 8);
    assert_eq!(codes(&frames), vec![42]);
}

#[test]
fn capacity_limits_output() {
    let dots = scene(&[(1, at(0.0, 0.0)), (2, at(200.0, 0.0)), (3, at(400.0, 0.0))]);
    assert_eq!(detector().detect(&dots, 2).len(), 2);
    assert_eq!(detector().detect(&dots, 3).len(), 3);
}

#[test]
fn registration_maps_marker_plane_to_corners() {
    let frames = detector().detect(&scene(&[(5, at(40.0, 60.0))]), 8);
    let frame = &frames[0];
    let h = frame.homography_from_marker().expect("sized frame");
    let far = h.apply(Point2::new(frame.width, frame.height));
    assert!((far - Point2::new(110.0, 130.0)).norm() < 1e-2);
}

#[test]
fn session_over_a_short_clip() {
    let mut session = DotFrameSession::new(detector(), 8);
    let layouts = [(11u32, at(50.0, 50.0)), (22u32, at(300.0, 50.0))];

    // Frame 1: both markers appear.
    let mut dots = scene(&layouts);
    let frames = session.process(&mut dots);
    assert_eq!(codes(frames), vec![11, 22]);

    // Frame 2: nothing moved.
    let mut dots = scene(&layouts);
    let frames = session.process(&mut dots);
    assert!(frames.iter().all(|f| f.detected_by == DetectedBy::Stationary));
    assert!(dots.iter().all(|d| !d.valid));

    // Frame 3: the first marker slides, the second stays.
    let mut moved = frame_dots(11, &layouts[0].1).expect("dots");
    apply_motion(&mut moved, &Homography::translation(Vector2::new(6.0, 4.0)));
    let mut dots = moved;
    dots.extend(frame_dots(22, &layouts[1].1).expect("dots"));
    let frames = session.process(&mut dots).to_vec();
    assert_eq!(frames.len(), 2);
    let by_code = |code| frames.iter().find(|f| f.code == Some(code)).expect("frame");
    assert_eq!(by_code(11).detected_by, DetectedBy::Moving);
    assert_eq!(by_code(22).detected_by, DetectedBy::Stationary);
    assert!((by_code(11).corners()[0] - Point2::new(56.0, 54.0)).norm() < 0.5);

    // Frame 4: the second marker leaves, a new one shows up.
    let mut dots = frame_dots(11, &layouts[0].1).expect("dots");
    apply_motion(&mut dots, &Homography::translation(Vector2::new(6.0, 4.0)));
    dots.extend(frame_dots(33, &at(300.0, 300.0)).expect("dots"));
    let frames = session.process(&mut dots);
    assert_eq!(codes(frames), vec![11, 33]);

    session.reset();
    assert!(session.frames().is_empty());
}

#[test]
fn undecodable_marker_is_not_reported() {
    let mut dots = scene(&[(42, SyntheticFrame::default())]);
    for dot in &mut dots[10..15] {
        dot.color = dotframe::DotColor::new(50.0, 1.0, 1.0);
    }
    assert!(detector().detect(&dots, 8).is_empty());
}
