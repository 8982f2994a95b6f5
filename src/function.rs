//! 전송 종류 (Modbus 펑션 코드) 테이블
//!
//! - 범위 읽기: FC1, FC2, FC3, FC4
//! - 단일 쓰기: FC5, FC6
//! - 범위 쓰기: FC15, FC16

use serde::{Deserialize, Serialize};

/// Read Coils 최대 수량 (FC1/FC2 응답 PDU 253바이트 기준)
pub const MAX_READ_COILS: u16 = 2000;

/// Read Holding/Input Registers 최대 수량 (FC3/FC4)
pub const MAX_READ_REGISTERS: u16 = 125;

/// Write Multiple Coils 최대 수량 (FC15)
pub const MAX_WRITE_COILS: u16 = 1968;

/// Write Multiple Registers 최대 수량 (FC16)
pub const MAX_WRITE_REGISTERS: u16 = 123;

/// 예외 코드: Illegal Function
pub const EXCEPTION_ILLEGAL_FUNCTION: u8 = 0x01;

/// 예외 코드: Illegal Data Address
pub const EXCEPTION_ILLEGAL_DATA_ADDRESS: u8 = 0x02;

/// 예외 코드: Illegal Data Value
pub const EXCEPTION_ILLEGAL_DATA_VALUE: u8 = 0x03;

/// 예외 코드: Server Device Failure
pub const EXCEPTION_SERVER_DEVICE_FAILURE: u8 = 0x04;

/// 예외 코드: Server Device Busy
pub const EXCEPTION_SERVER_DEVICE_BUSY: u8 = 0x06;

/// 요청 형태
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KindShape {
    /// 주소 + 수량 -> 값 배열
    RangeRead,

    /// 주소 + 값 하나 -> 값 에코
    SingleWrite,

    /// 주소 + 값 배열 -> 범위 에코
    RangeWrite,
}

/// 전송 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum FunctionKind {
    ReadCoils = 0x01,
    ReadDiscreteInputs = 0x02,
    ReadHoldingRegisters = 0x03,
    ReadInputRegisters = 0x04,
    WriteSingleCoil = 0x05,
    WriteSingleRegister = 0x06,
    WriteMultipleCoils = 0x0F,
    WriteMultipleRegisters = 0x10,
}

impl FunctionKind {
    /// 전체 종류 목록
    pub const ALL: [FunctionKind; 8] = [
        FunctionKind::ReadCoils,
        FunctionKind::ReadDiscreteInputs,
        FunctionKind::ReadHoldingRegisters,
        FunctionKind::ReadInputRegisters,
        FunctionKind::WriteSingleCoil,
        FunctionKind::WriteSingleRegister,
        FunctionKind::WriteMultipleCoils,
        FunctionKind::WriteMultipleRegisters,
    ];

    /// 펑션 코드
    pub fn code(self) -> u8 {
        self as u8
    }

    /// 펑션 코드에서 변환
    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.code() == code)
    }

    pub fn shape(self) -> KindShape {
        match self {
            FunctionKind::ReadCoils
            | FunctionKind::ReadDiscreteInputs
            | FunctionKind::ReadHoldingRegisters
            | FunctionKind::ReadInputRegisters => KindShape::RangeRead,
            FunctionKind::WriteSingleCoil | FunctionKind::WriteSingleRegister => {
                KindShape::SingleWrite
            }
            FunctionKind::WriteMultipleCoils | FunctionKind::WriteMultipleRegisters => {
                KindShape::RangeWrite
            }
        }
    }

    /// 비트(코일/입력) 대상 여부
    pub fn is_bit_access(self) -> bool {
        matches!(
            self,
            FunctionKind::ReadCoils
                | FunctionKind::ReadDiscreteInputs
                | FunctionKind::WriteSingleCoil
                | FunctionKind::WriteMultipleCoils
        )
    }

    /// 한 번의 전송에 허용되는 최대 수량
    pub fn max_quantity(self) -> u16 {
        match self {
            FunctionKind::ReadCoils | FunctionKind::ReadDiscreteInputs => MAX_READ_COILS,
            FunctionKind::ReadHoldingRegisters | FunctionKind::ReadInputRegisters => {
                MAX_READ_REGISTERS
            }
            FunctionKind::WriteSingleCoil | FunctionKind::WriteSingleRegister => 1,
            FunctionKind::WriteMultipleCoils => MAX_WRITE_COILS,
            FunctionKind::WriteMultipleRegisters => MAX_WRITE_REGISTERS,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            FunctionKind::ReadCoils => "FC1",
            FunctionKind::ReadDiscreteInputs => "FC2",
            FunctionKind::ReadHoldingRegisters => "FC3",
            FunctionKind::ReadInputRegisters => "FC4",
            FunctionKind::WriteSingleCoil => "FC5",
            FunctionKind::WriteSingleRegister => "FC6",
            FunctionKind::WriteMultipleCoils => "FC15",
            FunctionKind::WriteMultipleRegisters => "FC16",
        }
    }
}

impl std::fmt::Display for FunctionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_roundtrip() {
        for kind in FunctionKind::ALL {
            assert_eq!(FunctionKind::from_code(kind.code()), Some(kind));
        }
        assert_eq!(FunctionKind::from_code(0x2B), None);
    }

    #[test]
    fn test_shapes() {
        let reads = FunctionKind::ALL
            .iter()
            .filter(|k| k.shape() == KindShape::RangeRead)
            .count();
        let singles = FunctionKind::ALL
            .iter()
            .filter(|k| k.shape() == KindShape::SingleWrite)
            .count();
        let ranges = FunctionKind::ALL
            .iter()
            .filter(|k| k.shape() == KindShape::RangeWrite)
            .count();

        assert_eq!((reads, singles, ranges), (4, 2, 2));
    }

    #[test]
    fn test_protocol_limits_fit_pdu() {
        // 253바이트 PDU 제한
        assert!(1 + 1 + MAX_READ_REGISTERS as usize * 2 <= 253);
        assert!(1 + 2 + 2 + 1 + MAX_WRITE_REGISTERS as usize * 2 <= 253);
        assert!(1 + 1 + (MAX_READ_COILS as usize).div_ceil(8) <= 253);
        assert!(1 + 2 + 2 + 1 + (MAX_WRITE_COILS as usize).div_ceil(8) <= 253);
    }

    #[test]
    fn test_names() {
        assert_eq!(FunctionKind::WriteMultipleRegisters.to_string(), "FC16");
        assert_eq!(FunctionKind::ReadCoils.name(), "FC1");
    }
}
