//! Capture device errors raised while recording or creating resources

/// Run `f` inside out-of-memory and validation error scopes.
///
/// wgpu reports most failures asynchronously through the device instead of
/// the call that caused them. Scoping turns them back into a `Result` for the
/// caller. On native backends the popped futures are already resolved.
pub fn capture_errors<T>(device: &wgpu::Device, f: impl FnOnce() -> T) -> Result<T, wgpu::Error> {
    device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
    device.push_error_scope(wgpu::ErrorFilter::Validation);

    let value = f();

    let validation = pollster::block_on(device.pop_error_scope());
    let out_of_memory = pollster::block_on(device.pop_error_scope());

    match out_of_memory.or(validation) {
        Some(error) => Err(error),
        None => Ok(value),
    }
}
