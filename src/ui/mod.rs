/// UI layer: sidebar widgets, dashboard sections, charts, and tables.
pub mod central;
pub mod panels;
pub mod plot;
pub mod tables;
