/**
 * This module contains all logic for loading textures from external sources.
 */
pub mod texture;
