//! Bike-share planner server.
//!
//! Builds a geometric graph over a bike-share network's stations and
//! answers three questions over it: how stations connect, the fastest
//! bike + walk route between two addresses, and the cheapest way to
//! move bikes so every station meets minimum bike and dock targets.

pub mod domain;
pub mod gbfs;
pub mod geocode;
pub mod geomath;
pub mod graph;
pub mod planner;
pub mod rebalance;
pub mod web;
