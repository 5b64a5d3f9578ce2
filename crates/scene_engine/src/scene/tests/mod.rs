//! Cross-module tests for transform propagation, camera anchors and the frame sequence

mod camera_anchors;
