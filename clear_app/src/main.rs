//! Clear demo application
//!
//! Opens a window and clears every backbuffer to a flat color, exercising
//! device selection, command recording and the swapchain frame loop.
//!
//! Usage: `clear_app [config.toml|config.ron]`

use awki_rhi::logging;
use awki_rhi::prelude::*;
use nalgebra::Vector4;

fn record_clear(
    buffer: &mut CommandBuffer,
    backbuffer: &Texture,
    color: Vector4<f32>,
) -> RhiResult<()> {
    buffer.begin()?;
    buffer.transition_texture(
        backbuffer,
        ResourceState::Undefined,
        ResourceState::CopyDestination,
    )?;
    buffer.clear_color(backbuffer, ResourceState::CopyDestination, color)?;
    buffer.transition_texture(
        backbuffer,
        ResourceState::CopyDestination,
        ResourceState::Present,
    )?;
    buffer.end()
}

/// Only move the backbuffer into the present layout, leaving its contents undefined
fn record_present_only(buffer: &mut CommandBuffer, backbuffer: &Texture) -> RhiResult<()> {
    if buffer.is_recording() {
        buffer.end()?;
    }
    buffer.begin()?;
    buffer.transition_texture(backbuffer, ResourceState::Undefined, ResourceState::Present)?;
    buffer.end()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = match std::env::args().nth(1) {
        Some(path) => ApplicationConfig::load_from_file(path)?,
        None => ApplicationConfig::new("Clear"),
    };
    config.validate()?;
    logging::init_from_config(&config.engine);

    log::info!("Starting clear demo...");
    let mut window = GlfwWindow::new(&config.window)?;
    let device = Device::new(&config.device, &window)?;
    let mut allocator = CommandBufferAllocator::new(&device)?;
    let mut swapchain = Swapchain::new(&device, &window)?;

    let frame_buffers =
        allocator.allocate_command_buffers(QueueRole::Graphics, swapchain.backbuffer_count())?;
    let clear_color = Vector4::new(0.1, 0.2, 0.3, 1.0);
    let mut frames: u64 = 0;

    while !window.should_close() {
        window.poll_events();

        if !swapchain.prepare(&window)? {
            continue;
        }

        let submitted = {
            let buffer = allocator
                .get_mut(frame_buffers[swapchain.frame_index()])
                .ok_or("frame command buffer missing")?;
            let backbuffer = swapchain.current_backbuffer().ok_or("no backbuffer acquired")?;

            match record_clear(buffer, backbuffer, clear_color) {
                Ok(()) => vec![buffer.handle()],
                Err(e) => {
                    log::error!("Failed to record frame: {}", e);
                    match record_present_only(buffer, backbuffer) {
                        Ok(()) => vec![buffer.handle()],
                        Err(e) => {
                            // The acquire semaphore still has to be consumed, so the
                            // image is presented in whatever layout it is in.
                            log::error!("Failed to record present transition: {}", e);
                            Vec::new()
                        }
                    }
                }
            }
        };

        swapchain.present(&submitted)?;
        frames += 1;
    }

    log::info!("Presented {} frames, shutting down", frames);
    device.wait_idle()?;

    for id in frame_buffers {
        allocator.return_command_buffer(id);
    }
    drop(swapchain);
    drop(allocator);
    drop(device);

    log::info!("Clear demo finished");
    Ok(())
}
