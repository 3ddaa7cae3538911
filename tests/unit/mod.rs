mod window_properties;
