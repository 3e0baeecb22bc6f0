// HTTP surface: page routes (rendered page, login flow, health) and the
// polygon JSON API.
pub mod pages;
pub mod polygons;
