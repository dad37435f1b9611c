// ANCHOR: all
use std::fmt;
// ANCHOR: point
#[derive(Debug)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}
// ANCHOR_END: point
// ANCHOR_END: all
