//! Per-queue command pools
//!
//! The allocator owns one resettable pool per [`QueueRole`] and every
//! command buffer allocated from them. Callers hold [`CommandBufferId`]
//! keys and borrow buffers through [`CommandBufferAllocator::get_mut`].
//! Pools are not synchronized; use the allocator from one thread.

use ash::vk;
use slotmap::{new_key_type, SlotMap};

use crate::command_buffer::{CommandBackend, CommandBuffer};
use crate::device::{Device, PerQueue, QueueRole};
use crate::{RhiError, RhiResult};

new_key_type! {
    /// Key of a command buffer owned by a [`CommandBufferAllocator`]
    pub struct CommandBufferId;
}

struct CommandPool<D: CommandBackend> {
    device: D,
    pool: vk::CommandPool,
}

impl<D: CommandBackend> CommandPool<D> {
    fn new(device: &D, queue_family_index: u32) -> RhiResult<Self> {
        let pool = device
            .create_command_pool(queue_family_index)
            .map_err(RhiError::from)?;
        Ok(Self {
            device: device.clone(),
            pool,
        })
    }
}

impl<D: CommandBackend> Drop for CommandPool<D> {
    fn drop(&mut self) {
        self.device.destroy_command_pool(self.pool);
    }
}

/// Lends command buffers from one pool per queue role
pub struct CommandBufferAllocator<D: CommandBackend = ash::Device> {
    // Buffers are declared first so they are freed before their pools
    buffers: SlotMap<CommandBufferId, CommandBuffer<D>>,
    pools: PerQueue<CommandPool<D>>,
    device: D,
}

impl CommandBufferAllocator {
    /// Create the graphics, compute and transfer pools on `device`
    pub fn new(device: &Device) -> RhiResult<Self> {
        let families = PerQueue::from_fn(|role| device.queue_family_index(role));
        Self::with_backend(device.device().clone(), families)
    }
}

impl<D: CommandBackend> CommandBufferAllocator<D> {
    /// Create one pool per role on the given queue families
    pub fn with_backend(device: D, queue_families: PerQueue<u32>) -> RhiResult<Self> {
        let pools = PerQueue::try_from_fn(|role| {
            CommandPool::new(&device, *queue_families.get(role)).map_err(|e| {
                log::error!("Failed to create {:?} command pool: {}", role, e);
                e
            })
        })?;

        log::debug!("Command pools created");
        Ok(Self {
            buffers: SlotMap::with_key(),
            pools,
            device,
        })
    }

    /// Allocate one primary command buffer for `role`
    pub fn allocate_command_buffer(&mut self, role: QueueRole) -> RhiResult<CommandBufferId> {
        let mut ids = self.allocate_command_buffers(role, 1)?;
        ids.pop().ok_or_else(|| RhiError::InvalidOperation {
            reason: "Command buffer allocation returned no buffers".to_string(),
        })
    }

    /// Allocate `count` primary command buffers for `role`
    ///
    /// Either every buffer is registered or none is.
    pub fn allocate_command_buffers(
        &mut self,
        role: QueueRole,
        count: u32,
    ) -> RhiResult<Vec<CommandBufferId>> {
        if count == 0 {
            return Ok(Vec::new());
        }

        let pool = self.pools.get(role).pool;
        let handles = self
            .device
            .allocate_command_buffers(pool, count)
            .map_err(|e| {
                log::error!("Failed to allocate {} {:?} command buffers: {:?}", count, role, e);
                RhiError::from(e)
            })?;

        if handles.len() != count as usize {
            log::error!("Requested {} {:?} command buffers, got {}", count, role, handles.len());
            if !handles.is_empty() {
                self.device.free_command_buffers(pool, &handles);
            }
            return Err(RhiError::InvalidOperation {
                reason: format!(
                    "Expected {count} command buffers, driver returned {}",
                    handles.len()
                ),
            });
        }

        Ok(handles
            .into_iter()
            .map(|handle| {
                self.buffers
                    .insert(CommandBuffer::new(self.device.clone(), pool, handle, role))
            })
            .collect())
    }

    /// Free the buffer behind `id`
    ///
    /// Returns `false` when `id` was already returned.
    pub fn return_command_buffer(&mut self, id: CommandBufferId) -> bool {
        self.buffers.remove(id).is_some()
    }

    /// Borrow the buffer behind `id`
    pub fn get(&self, id: CommandBufferId) -> Option<&CommandBuffer<D>> {
        self.buffers.get(id)
    }

    /// Mutably borrow the buffer behind `id` for recording
    pub fn get_mut(&mut self, id: CommandBufferId) -> Option<&mut CommandBuffer<D>> {
        self.buffers.get_mut(id)
    }

    /// Number of buffers currently lent out
    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    /// Whether no buffer is lent out
    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }

    /// Pool backing `role`
    pub fn pool(&self, role: QueueRole) -> vk::CommandPool {
        self.pools.get(role).pool
    }
}

impl<D: CommandBackend> Drop for CommandBufferAllocator<D> {
    fn drop(&mut self) {
        if !self.buffers.is_empty() {
            log::debug!("Freeing {} outstanding command buffers", self.buffers.len());
        }
        self.buffers.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command_buffer::scripted::{Call, ScriptedCommands};

    fn families() -> PerQueue<u32> {
        PerQueue {
            graphics: 0,
            compute: 1,
            transfer: 2,
        }
    }

    fn allocator() -> (ScriptedCommands, CommandBufferAllocator<ScriptedCommands>) {
        let commands = ScriptedCommands::default();
        let allocator = CommandBufferAllocator::with_backend(commands.clone(), families()).unwrap();
        (commands, allocator)
    }

    fn count_frees(calls: &[Call]) -> usize {
        calls.iter().filter(|call| matches!(call, Call::Free(..))).count()
    }

    #[test]
    fn test_one_pool_per_role() {
        let (commands, allocator) = allocator();

        assert_eq!(
            commands.calls(),
            vec![Call::CreatePool(0), Call::CreatePool(1), Call::CreatePool(2)]
        );
        assert_ne!(allocator.pool(QueueRole::Graphics), allocator.pool(QueueRole::Compute));
        assert_ne!(allocator.pool(QueueRole::Compute), allocator.pool(QueueRole::Transfer));
    }

    #[test]
    fn test_failed_pool_destroys_the_ones_already_created() {
        let commands = ScriptedCommands::default();
        commands.script.borrow_mut().fail_pool_family = Some(1);

        let result = CommandBufferAllocator::with_backend(commands.clone(), families());
        assert!(matches!(
            result,
            Err(RhiError::Api(vk::Result::ERROR_OUT_OF_DEVICE_MEMORY))
        ));

        let calls = commands.calls();
        assert_eq!(calls.len(), 3);
        assert!(matches!(calls[2], Call::DestroyPool(_)));
    }

    #[test]
    fn test_allocated_buffers_are_registered() {
        let (_commands, mut allocator) = allocator();

        let ids = allocator.allocate_command_buffers(QueueRole::Compute, 3).unwrap();
        let single = allocator.allocate_command_buffer(QueueRole::Transfer).unwrap();

        assert_eq!(ids.len(), 3);
        assert_eq!(allocator.len(), 4);
        for id in &ids {
            let buffer = allocator.get(*id).unwrap();
            assert_eq!(buffer.role(), QueueRole::Compute);
            assert!(!buffer.is_recording());
        }
        assert_eq!(allocator.get(single).unwrap().role(), QueueRole::Transfer);
    }

    #[test]
    fn test_zero_count_allocates_nothing() {
        let (commands, mut allocator) = allocator();

        assert!(allocator.allocate_command_buffers(QueueRole::Graphics, 0).unwrap().is_empty());
        assert!(allocator.is_empty());
        assert!(!commands.calls().iter().any(|call| matches!(call, Call::Allocate(..))));
    }

    #[test]
    fn test_short_allocation_registers_nothing() {
        let (commands, mut allocator) = allocator();
        commands.script.borrow_mut().short_allocation = true;

        let result = allocator.allocate_command_buffers(QueueRole::Graphics, 3);

        assert!(matches!(result, Err(RhiError::InvalidOperation { .. })));
        assert!(allocator.is_empty());
        let pool = allocator.pool(QueueRole::Graphics);
        match commands.calls().last() {
            Some(Call::Free(freed_from, handles)) => {
                assert_eq!(*freed_from, pool);
                assert_eq!(handles.len(), 2);
            }
            other => panic!("expected the partial allocation to be freed, got {other:?}"),
        }
    }

    #[test]
    fn test_failed_allocation_registers_nothing() {
        let (commands, mut allocator) = allocator();
        commands.script.borrow_mut().fail_allocation = Some(vk::Result::ERROR_OUT_OF_HOST_MEMORY);

        let result = allocator.allocate_command_buffer(QueueRole::Graphics);

        assert!(matches!(
            result,
            Err(RhiError::Api(vk::Result::ERROR_OUT_OF_HOST_MEMORY))
        ));
        assert!(allocator.is_empty());
        assert_eq!(count_frees(&commands.calls()), 0);
    }

    #[test]
    fn test_return_frees_once() {
        let (commands, mut allocator) = allocator();
        let id = allocator.allocate_command_buffer(QueueRole::Graphics).unwrap();
        let handle = allocator.get(id).unwrap().handle();

        assert!(allocator.return_command_buffer(id));
        assert!(!allocator.return_command_buffer(id));
        assert!(allocator.get(id).is_none());
        assert!(allocator.is_empty());

        let calls = commands.calls();
        assert_eq!(count_frees(&calls), 1);
        assert_eq!(
            calls.last(),
            Some(&Call::Free(allocator.pool(QueueRole::Graphics), vec![handle]))
        );
    }

    #[test]
    fn test_returned_id_is_not_reused() {
        let (_commands, mut allocator) = allocator();
        let first = allocator.allocate_command_buffer(QueueRole::Graphics).unwrap();
        allocator.return_command_buffer(first);
        let second = allocator.allocate_command_buffer(QueueRole::Graphics).unwrap();

        assert_ne!(first, second);
        assert!(allocator.get(first).is_none());
        assert!(allocator.get(CommandBufferId::default()).is_none());
    }

    #[test]
    fn test_drop_frees_buffers_before_pools() {
        let (commands, mut allocator) = allocator();
        allocator.allocate_command_buffers(QueueRole::Graphics, 2).unwrap();
        allocator.allocate_command_buffer(QueueRole::Transfer).unwrap();
        let before = commands.calls().len();

        drop(allocator);

        let teardown = commands.calls().split_off(before);
        assert_eq!(teardown.len(), 6);
        assert!(teardown[..3].iter().all(|call| matches!(call, Call::Free(..))));
        assert!(teardown[3..].iter().all(|call| matches!(call, Call::DestroyPool(_))));
    }

    #[test]
    fn test_recorded_buffer_reports_through_allocator() {
        let (commands, mut allocator) = allocator();
        let id = allocator.allocate_command_buffer(QueueRole::Graphics).unwrap();

        let buffer = allocator.get_mut(id).unwrap();
        buffer.begin().unwrap();
        buffer.end().unwrap();
        let handle = buffer.handle();

        let calls = commands.calls();
        assert_eq!(calls[calls.len() - 2..], [Call::Begin(handle), Call::End(handle)]);
    }
}
