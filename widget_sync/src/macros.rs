/// Implements the `Any` accessors of `WidgetBehavior` for a concrete type.
#[macro_export]
macro_rules! behavior_any {
    () => {
        fn as_any(&self) -> &dyn ::std::any::Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn ::std::any::Any {
            self
        }
    };
}
